use eframe::egui::epaint::Vertex;
use eframe::egui::{
    Align2, Color32, FontId, Mesh, Painter, Pos2, Shape, Stroke, TextureId, pos2, vec2,
};

const CIRCLE_SEGMENTS: u32 = 48;

pub(super) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn paint_glow(painter: &Painter, center: Pos2, radius: f32, color: Color32) {
    painter.circle_stroke(center, radius + 1.0, Stroke::new(4.0, color));
    for step in 1..=4 {
        let spread = step as f32 * 3.0;
        let alpha = (110 / (step + 1)) as u8;
        painter.circle_stroke(
            center,
            radius + 1.0 + spread,
            Stroke::new(3.0, with_alpha(color, alpha)),
        );
    }
}

pub(super) fn shadowed_text(
    painter: &Painter,
    center: Pos2,
    text: &str,
    size: f32,
    color: Color32,
) {
    let font = FontId::proportional(size);
    painter.text(
        center + vec2(1.0, 1.0),
        Align2::CENTER_CENTER,
        text,
        font.clone(),
        Color32::from_black_alpha(150),
    );
    painter.text(center, Align2::CENTER_CENTER, text, font, color);
}

pub(super) fn circle_image_mesh(texture: TextureId, center: Pos2, radius: f32) -> Mesh {
    let mut mesh = Mesh::with_texture(texture);
    mesh.vertices.push(Vertex {
        pos: center,
        uv: pos2(0.5, 0.5),
        color: Color32::WHITE,
    });

    for segment in 0..=CIRCLE_SEGMENTS {
        let angle = segment as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        mesh.vertices.push(Vertex {
            pos: center + vec2(cos, sin) * radius,
            uv: pos2(0.5 + cos * 0.5, 0.5 + sin * 0.5),
            color: Color32::WHITE,
        });
    }
    for segment in 1..=CIRCLE_SEGMENTS {
        mesh.add_triangle(0, segment, segment + 1);
    }
    mesh
}

pub(super) fn paint_circle_image(
    painter: &Painter,
    texture: TextureId,
    center: Pos2,
    radius: f32,
) {
    if radius < 1.0 {
        return;
    }
    painter.add(Shape::mesh(circle_image_mesh(texture, center, radius)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_mesh_is_a_closed_fan() {
        let mesh = circle_image_mesh(TextureId::default(), pos2(10.0, 10.0), 5.0);

        assert_eq!(mesh.vertices.len(), CIRCLE_SEGMENTS as usize + 2);
        assert_eq!(mesh.indices.len(), CIRCLE_SEGMENTS as usize * 3);
        assert!(mesh.vertices[1..].iter().all(|vertex| {
            ((vertex.pos - pos2(10.0, 10.0)).length() - 5.0).abs() < 1e-3
                && (0.0..=1.0).contains(&vertex.uv.x)
                && (0.0..=1.0).contains(&vertex.uv.y)
        }));
    }

    #[test]
    fn blending_and_alpha_keep_channels_in_range() {
        let mixed = blend_color(Color32::BLACK, Color32::WHITE, 2.0);
        assert_eq!(mixed, Color32::WHITE);
        assert_eq!(with_alpha(Color32::from_rgb(1, 2, 3), 0x80).a(), 0x80);
    }
}
