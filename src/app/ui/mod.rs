mod chart;
mod controls;
mod fps;
mod tooltip;

pub(in crate::app) use fps::FrameStats;
