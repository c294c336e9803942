use crate::error::{RelayError, Result};
use crate::models::gemini::{InlineData, Part};
use crate::models::openai::ContentPart;
use crate::transform::Dialect;

/// Boundary between the MIME type and the payload in a data-URI.
pub const DATA_URI_MARKER: &str = ";base64,";

/// Formats inline media as a `data:<mime>;base64,<payload>` URI.
pub fn format_data_uri(mime_type: &str, data: &str) -> String {
    format!("data:{mime_type}{DATA_URI_MARKER}{data}")
}

/// Whether a text payload is a recognizable data-URI.
pub fn is_data_uri(text: &str) -> bool {
    text.starts_with("data:") && text.contains(DATA_URI_MARKER)
}

/// Parses a data-URI back into inline media, splitting on the first
/// `;base64,` boundary.
pub fn parse_data_uri(uri: &str) -> Result<InlineData> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RelayError::InvalidMediaEncoding(preview(uri)))?;

    let (mime_type, data) = rest
        .split_once(DATA_URI_MARKER)
        .ok_or_else(|| RelayError::InvalidMediaEncoding(preview(uri)))?;

    Ok(InlineData {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

fn preview(uri: &str) -> String {
    let head: String = uri.chars().take(48).collect();
    format!("not a base64 data-URI: {head}")
}

/// Encodes a caller part into the upstream part shape for the given dialect.
pub fn encode_part(part: &Part, dialect: Dialect) -> ContentPart {
    match (part, dialect) {
        (Part::Text { text }, Dialect::OpenAi) => ContentPart::typed_text(text.clone()),
        (Part::Text { text }, Dialect::Inline) => ContentPart::BareText {
            text: text.trim().to_string(),
        },
        (Part::InlineData { inline_data }, Dialect::OpenAi) => {
            ContentPart::image_url(format_data_uri(&inline_data.mime_type, &inline_data.data))
        }
        (Part::InlineData { inline_data }, Dialect::Inline) => ContentPart::InlineData {
            inline_data: inline_data.clone(),
        },
    }
}

/// Decodes an upstream reply part back into the caller schema.
///
/// Text carrying a data-URI decodes to inline media; an unrecognized part is
/// passed through unchanged as text, tolerating backend schema drift.
pub fn decode_part(part: &ContentPart) -> Result<Part> {
    match part {
        ContentPart::TypedText { text, .. } | ContentPart::BareText { text } => {
            if is_data_uri(text) {
                Ok(Part::InlineData {
                    inline_data: parse_data_uri(text)?,
                })
            } else {
                Ok(Part::Text { text: text.clone() })
            }
        }
        ContentPart::ImageUrl { image_url, .. } => Ok(Part::InlineData {
            inline_data: parse_data_uri(&image_url.url)?,
        }),
        ContentPart::InlineData { inline_data } => Ok(Part::InlineData {
            inline_data: inline_data.clone(),
        }),
        ContentPart::Other(value) => Ok(Part::Text {
            text: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_parse_data_uri() {
        let uri = format_data_uri("image/png", "QUJD");
        assert_eq!(uri, "data:image/png;base64,QUJD");

        let inline = parse_data_uri(&uri).unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "QUJD");
    }

    #[test]
    fn test_parse_data_uri_splits_on_first_marker() {
        let inline = parse_data_uri("data:image/png;base64,AAA;base64,BBB").unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "AAA;base64,BBB");
    }

    #[test]
    fn test_parse_data_uri_malformed() {
        assert!(matches!(
            parse_data_uri("data:image/png,QUJD"),
            Err(RelayError::InvalidMediaEncoding(_))
        ));
        assert!(matches!(
            parse_data_uri("https://example.com/cat.png"),
            Err(RelayError::InvalidMediaEncoding(_))
        ));
    }

    #[test]
    fn test_encode_text_openai() {
        let part = Part::Text {
            text: "  hello  ".to_string(),
        };
        // OpenAI dialect keeps text verbatim
        assert_eq!(
            encode_part(&part, Dialect::OpenAi),
            ContentPart::typed_text("  hello  ")
        );
    }

    #[test]
    fn test_encode_text_inline_trims() {
        let part = Part::Text {
            text: "  hello  ".to_string(),
        };
        assert_eq!(
            encode_part(&part, Dialect::Inline),
            ContentPart::BareText {
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_encode_media_per_dialect() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "image/png".to_string(),
                data: "QUJD".to_string(),
            },
        };

        assert_eq!(
            encode_part(&part, Dialect::OpenAi),
            ContentPart::image_url("data:image/png;base64,QUJD")
        );

        match encode_part(&part, Dialect::Inline) {
            ContentPart::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                assert_eq!(inline_data.data, "QUJD");
            }
            other => panic!("Expected InlineData part, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_image_url_part() {
        let part = ContentPart::image_url("data:image/jpeg;base64,Zm9v");
        match decode_part(&part).unwrap() {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/jpeg");
                assert_eq!(inline_data.data, "Zm9v");
            }
            other => panic!("Expected inline media, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_data_uri_in_text_part() {
        let part = ContentPart::typed_text("data:image/png;base64,QUJD");
        assert!(matches!(
            decode_part(&part).unwrap(),
            Part::InlineData { .. }
        ));
    }

    #[test]
    fn test_decode_plain_text_round_trip() {
        let original = Part::Text {
            text: "no escaping, no truncation: \"quotes\" & newlines\n".to_string(),
        };

        let decoded = decode_part(&encode_part(&original, Dialect::OpenAi)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_malformed_image_url_fails() {
        let part = ContentPart::image_url("data:image/png,raw-not-base64");
        assert!(matches!(
            decode_part(&part),
            Err(RelayError::InvalidMediaEncoding(_))
        ));
    }

    #[test]
    fn test_unknown_part_passes_through() {
        let part = ContentPart::Other(serde_json::json!({"video": "clip.mp4"}));
        match decode_part(&part).unwrap() {
            Part::Text { text } => assert!(text.contains("clip.mp4")),
            other => panic!("Expected pass-through text, got {other:?}"),
        }
    }
}
