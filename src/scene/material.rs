//! Material resources.
//!
//! Texture slots are kept as opaque path references. Nothing in this crate
//! decodes them; they describe what the material was authored with.

use std::path::PathBuf;

/// Which triangle faces a material renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Counter-clockwise faces only.
    #[default]
    Front,
    /// Both windings, no culling.
    Double,
}

/// Opaque texture references for a material's map slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSlots {
    /// Base color map.
    pub map: Option<PathBuf>,
    /// Tangent-space normal map.
    pub normal_map: Option<PathBuf>,
    /// Height map for vertex displacement.
    pub displacement_map: Option<PathBuf>,
    /// Ambient occlusion map.
    pub ao_map: Option<PathBuf>,
    /// Roughness map.
    pub roughness_map: Option<PathBuf>,
    /// Metalness map.
    pub metalness_map: Option<PathBuf>,
    /// Alpha map.
    pub alpha_map: Option<PathBuf>,
}

impl TextureSlots {
    /// Slots for a texture set laid out as `<dir>/<stem>_<suffix>`, the way
    /// material libraries export PBR sets.
    #[must_use]
    pub fn from_set(dir: &std::path::Path, stem: &str, with_alpha: bool) -> Self {
        let file = |suffix: &str| Some(dir.join(format!("{stem}_{suffix}")));
        Self {
            map: file("basecolor.jpg"),
            normal_map: file("normal.jpg"),
            displacement_map: file("height.png"),
            ao_map: file("ambientOcclusion.jpg"),
            roughness_map: file("roughness.jpg"),
            metalness_map: file("metallic.jpg"),
            alpha_map: if with_alpha { file("opacity.jpg") } else { None },
        }
    }

    /// Number of populated slots.
    #[must_use]
    pub fn len(&self) -> usize {
        [
            &self.map,
            &self.normal_map,
            &self.displacement_map,
            &self.ao_map,
            &self.roughness_map,
            &self.metalness_map,
            &self.alpha_map,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count()
    }

    /// Whether no slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Metal/rough surface description.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    /// Linear RGB base color.
    pub color: [f32; 3],
    /// Perceptual roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metalness: f32,
    /// Alpha when `transparent` is set.
    pub opacity: f32,
    /// Whether the material is blended rather than opaque.
    pub transparent: bool,
    /// Face culling mode.
    pub side: Side,
    /// Whether meshes using this material are drawn at all.
    pub visible: bool,
    /// Whether scene fog applies.
    pub fog: bool,
    /// Height-map displacement scale.
    pub displacement_scale: f32,
    /// Height-map displacement bias.
    pub displacement_bias: f32,
    /// Ambient occlusion map strength.
    pub ao_map_intensity: f32,
    /// Texture references.
    pub textures: TextureSlots,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            visible: true,
            fog: true,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            ao_map_intensity: 1.0,
            textures: TextureSlots::default(),
        }
    }
}

impl StandardMaterial {
    /// Material with the given sRGB hex color, e.g. `0x9b59b6`.
    #[must_use]
    pub fn with_hex(hex: u32) -> Self {
        Self {
            color: hex_to_linear(hex),
            ..Self::default()
        }
    }

    /// Alpha written to the color target.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        if self.transparent {
            self.opacity
        } else {
            1.0
        }
    }
}

/// Convert a packed sRGB hex color to linear RGB.
#[must_use]
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_white_and_black() {
        assert_eq!(hex_to_linear(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn texture_set_paths() {
        let slots = TextureSlots::from_set(
            std::path::Path::new("images/metal"),
            "Metal_Grill_021",
            true,
        );
        assert_eq!(slots.len(), 7);
        assert_eq!(
            slots.map.as_deref(),
            Some(std::path::Path::new(
                "images/metal/Metal_Grill_021_basecolor.jpg"
            ))
        );
        let no_alpha = TextureSlots::from_set(
            std::path::Path::new("images/metal"),
            "Metal_scratched_008",
            false,
        );
        assert_eq!(no_alpha.len(), 6);
    }

    #[test]
    fn opaque_alpha_ignores_opacity() {
        let mut m = StandardMaterial {
            opacity: 0.6,
            ..StandardMaterial::default()
        };
        assert_eq!(m.alpha(), 1.0);
        m.transparent = true;
        assert_eq!(m.alpha(), 0.6);
    }
}
