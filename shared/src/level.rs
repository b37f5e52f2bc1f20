//! Level data as plain structured input to setup.
//!
//! Decoding packed scene assets into this form happens upstream; the core
//! only sees a list of oriented boxes plus a table that marks some of them as
//! movers. JSON is accepted either as a full `{ "elements": [...], "movers":
//! [...] }` object or as a bare element array, in which case the built-in
//! mover table applies.

use serde::{Deserialize, Serialize};

use crate::{
    error::SetupError,
    mover::MoverKind,
    vector::{self, Vec3, xyz},
};

/// Source-space bounds of a level element before translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelBox {
    #[serde(with = "xyz")]
    pub min: Vec3,
    #[serde(with = "xyz")]
    pub max: Vec3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelElement {
    pub id: String,
    #[serde(rename = "box")]
    pub bounds: LevelBox,
    /// Rotation about +Y (radians).
    #[serde(default)]
    pub rotation: f32,
    #[serde(with = "xyz", default = "Vec3::zeros")]
    pub translation: Vec3,
}

impl LevelElement {
    /// World-space center: box midpoint plus translation.
    pub fn center(&self) -> Vec3 {
        vector::add(
            vector::average(self.bounds.min, self.bounds.max),
            self.translation,
        )
    }

    /// Full extents of the box.
    pub fn size(&self) -> Vec3 {
        vector::sub(self.bounds.max, self.bounds.min)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        let LevelBox { min, max } = self.bounds;
        if !(vector::is_finite(min)
            && vector::is_finite(max)
            && vector::is_finite(self.translation)
            && self.rotation.is_finite())
        {
            return Err(SetupError::NonFiniteElement {
                id: self.id.clone(),
            });
        }
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(SetupError::InvertedElement {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Marks every level element named `element_id` as a mover of `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverSpec {
    pub element_id: String,
    pub kind: MoverKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub elements: Vec<LevelElement>,
    #[serde(default = "default_movers")]
    pub movers: Vec<MoverSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelFile {
    Full(Level),
    Elements(Vec<LevelElement>),
}

impl Level {
    /// A level using the built-in mover table.
    pub fn new(elements: Vec<LevelElement>) -> Self {
        Self {
            elements,
            movers: default_movers(),
        }
    }

    /// Decode and validate level JSON. Any failure is fatal for setup.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let level = match serde_json::from_str::<LevelFile>(json)? {
            LevelFile::Full(level) => level,
            LevelFile::Elements(elements) => Level::new(elements),
        };
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.elements.is_empty() {
            return Err(SetupError::EmptyLevel);
        }
        self.elements.iter().try_for_each(LevelElement::validate)
    }

    /// Mover kind attached to the element with this id, if any.
    pub fn mover_for(&self, element_id: &str) -> Option<&MoverSpec> {
        self.movers.iter().find(|m| m.element_id == element_id)
    }
}

/// The stock level's only moving platform.
pub fn default_movers() -> Vec<MoverSpec> {
    vec![MoverSpec {
        element_id: "platform003".into(),
        kind: MoverKind::SimpleTranslate {
            direction: Vec3::new(0.0, 0.0, 1.0),
            amplitude: 3.0,
            period_ms: 5000,
            phase_offset_ms: 1250,
        },
    }]
}
