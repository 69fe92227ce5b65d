use std::fmt;

/// Every fatal error the crate can report, matching the teacher's plain
/// hand-rolled `Display`/`Error` style rather than reaching for an
/// error-derive crate (§7 "Error handling").
#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    ObjParse(String),
    ConfigParse(String),
    DegenerateTriangle(String),
    UnknownLightType(String),
    MissingMaterial(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "i/o error: {e}"),
            SceneError::ObjParse(msg) => write!(f, "failed to parse OBJ/MTL: {msg}"),
            SceneError::ConfigParse(msg) => write!(f, "failed to parse scene config: {msg}"),
            SceneError::DegenerateTriangle(mesh) => {
                write!(f, "mesh '{mesh}' contains a degenerate (zero-area) triangle")
            }
            SceneError::UnknownLightType(ty) => write!(f, "unknown light type '{ty}'"),
            SceneError::MissingMaterial(mesh) => {
                write!(f, "mesh '{mesh}' references a material index that doesn't exist")
            }
        }
    }
}

impl std::error::Error for SceneError {}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}
