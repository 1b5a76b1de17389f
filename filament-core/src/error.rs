//! Error types.

use thiserror::Error;

/// Errors raised by mounting, rendering and the document model.
///
/// Mount and render do not roll back on failure: refs and child components
/// bound before the failing step stay bound.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no mount target matches selector `{selector}`")]
    MissingMountNode { selector: String },

    #[error("mount target has no parent node")]
    OrphanMountNode,

    #[error("no element carries ref token `{token}`")]
    MissingRefTarget { token: String },

    #[error("found {markers} child markers for {components} child components")]
    MarkerCountMismatch { markers: usize, components: usize },

    #[error("template has {holes} holes but {values} values were given")]
    TemplateArity { holes: usize, values: usize },

    #[error("component is already mounted in another document")]
    ForeignDocument,

    #[error("component has been destroyed")]
    Destroyed,

    #[error("unsupported selector `{selector}`")]
    InvalidSelector { selector: String },

    #[error("failed to parse html: {reason}")]
    HtmlParse { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = Error::MissingMountNode {
            selector: "#missing".into(),
        };
        assert_eq!(err.to_string(), "no mount target matches selector `#missing`");

        let err = Error::MarkerCountMismatch {
            markers: 2,
            components: 1,
        };
        assert_eq!(err.to_string(), "found 2 child markers for 1 child components");
    }
}
