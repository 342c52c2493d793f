use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("Unknown reference frame: {0}")]
    UnknownFrame(String),
}

/// Frames that go along with anything.
pub const UNIVERSALLY_COMPATIBLE: [&str; 4] = ["RELOCATABLE", "UNKNOWN", "", "BROKEN"];

/// Euler angles rotating ICRS into the frame; `None` for frames
/// treated as identical to ICRS.
fn euler_angles(frame: &str) -> Result<Option<(f64, f64, f64)>, GeometryError> {
    match frame {
        "ICRS" | "FK5" => Ok(None),
        "FK4" => Ok(Some((1.5651864333666516, -0.0048590552804904244, -1.5763681043529187))),
        "GALACTIC" => Ok(Some((1.3463560974407338, -1.0973190018372752, 0.57477052472873258))),
        other => Err(GeometryError::UnknownFrame(other.to_string())),
    }
}

pub fn normalize_frame(frame: Option<&str>) -> String {
    frame.map(|f| f.trim().to_uppercase()).unwrap_or_default()
}

pub fn is_universally_compatible(frame: Option<&str>) -> bool {
    UNIVERSALLY_COMPATIBLE.contains(&normalize_frame(frame).as_str())
}

/// Whether two frames may be mixed without a transformation.
pub fn frames_compatible(a: Option<&str>, b: Option<&str>) -> bool {
    is_universally_compatible(a)
        || is_universally_compatible(b)
        || normalize_frame(a) == normalize_frame(b)
}

/// Returns the pgsphere fragment turning a geometry in `from` into
/// `to`, or `None` if no transformation is needed.
pub fn pgsphere_trafo(from: Option<&str>, to: Option<&str>) -> Result<Option<String>, GeometryError> {
    if frames_compatible(from, to) {
        return Ok(None);
    }
    let (from, to) = (normalize_frame(from), normalize_frame(to));

    let to_icrs = euler_angles(&from)?
        .map(|(a, b, c)| format!("-strans({:.6},{:.6},{:.6})", a, b, c));
    let from_icrs = euler_angles(&to)?
        .map(|(a, b, c)| format!("+strans({:.6},{:.6},{:.6})", a, b, c));

    match (to_icrs, from_icrs) {
        (None, None) => Ok(None),
        (a, b) => Ok(Some(format!("{}{}", a.unwrap_or_default(), b.unwrap_or_default()))),
    }
}
