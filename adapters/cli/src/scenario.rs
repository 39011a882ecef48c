#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use crownhold_core::{BuildingKind, CellCoord};
use serde::{Deserialize, Serialize};

const LAYOUT_DOMAIN: &str = "crownhold";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
#[allow(dead_code)] // used by the test module; no non-test caller yet
pub(crate) const LAYOUT_HEADER: &str = "crownhold:v1";
/// Delimiter used to separate the prefix, map dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of an opening city layout and the grids it assumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutSnapshot {
    /// Map width measured in world units.
    pub(crate) width: u32,
    /// Map height measured in world units.
    pub(crate) height: u32,
    /// Side length of a build-grid cell in world units.
    pub(crate) build_cell: u32,
    /// Side length of a pathfinding-grid cell in world units.
    pub(crate) path_cell: u32,
    /// Buildings to place, in order, when the scenario starts.
    pub(crate) placements: Vec<LayoutPlacement>,
}

impl LayoutSnapshot {
    /// Encodes the layout into a single-line string suitable for sharing.
    #[must_use]
    #[allow(dead_code)] // used by the test module; no non-test caller yet
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableLayout {
            build_cell: self.build_cell,
            path_cell: self.path_cell,
            placements: self.placements.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("layout serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{LAYOUT_HEADER}:{}x{}:{encoded}", self.width, self.height)
    }

    /// Decodes a layout from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutError::InvalidEncoding)?;
        let decoded: SerializableLayout =
            serde_json::from_slice(&bytes).map_err(LayoutError::InvalidPayload)?;

        Ok(Self {
            width,
            height,
            build_cell: decoded.build_cell,
            path_cell: decoded.path_cell,
            placements: decoded.placements,
        })
    }
}

/// Building description captured within a layout snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutPlacement {
    /// Kind of building represented by the placement.
    pub(crate) kind: BuildingKind,
    /// Upper-left build-grid cell anchoring the footprint.
    pub(crate) origin: CellCoord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    build_cell: u32,
    path_cell: u32,
    placements: Vec<LayoutPlacement>,
}

/// Errors that can occur while decoding layout strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LayoutError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded layout did not include map dimensions.
    #[error("layout string is missing the map dimensions")]
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The map dimensions could not be parsed from the encoded layout.
    #[error("could not parse map dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || height == 0 {
        return Err(LayoutError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((width, height))
}
