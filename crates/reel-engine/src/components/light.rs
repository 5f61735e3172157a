use super::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    /// Sky/ground gradient; `ground` holds the lower color.
    Hemisphere,
    Directional,
    Point,
    Spot,
}

impl LightKind {
    pub fn tag(self) -> u32 {
        match self {
            LightKind::Ambient => 0,
            LightKind::Hemisphere => 1,
            LightKind::Directional => 2,
            LightKind::Point => 3,
            LightKind::Spot => 4,
        }
    }
}

/// Light component. Position and direction come from the owning entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub ground: Color,
    pub intensity: f32,
    /// Falloff distance for point and spot lights. 0 means unbounded.
    pub range: f32,
}

impl Light {
    fn of(kind: LightKind, color: Color, intensity: f32) -> Self {
        Self {
            kind,
            color,
            ground: Color::BLACK,
            intensity,
            range: 0.0,
        }
    }

    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::of(LightKind::Ambient, color, intensity)
    }

    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Self { ground, ..Self::of(LightKind::Hemisphere, sky, intensity) }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self::of(LightKind::Directional, color, intensity)
    }

    pub fn point(color: Color, intensity: f32, range: f32) -> Self {
        Self { range, ..Self::of(LightKind::Point, color, intensity) }
    }

    pub fn spot(color: Color, intensity: f32, range: f32) -> Self {
        Self { range, ..Self::of(LightKind::Spot, color, intensity) }
    }
}
