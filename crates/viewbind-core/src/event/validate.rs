use super::{Event, EventKind};
use crate::errors::{Result, ViewError};

/// Check that `events` form a single well-formed element
///
/// Rules: every `End*` closes the innermost open `Begin*` with the
/// complementary kind and identical name and namespace; nothing is left
/// open; a `Discriminator` appears only as the first child of an object;
/// at most one top-level element. An empty view is accepted (the root was
/// vetoed).
///
/// # Errors
///
/// Returns `MalformedStream` describing the first violation, with the
/// position of the offending event as its path.
pub fn validate(events: &[Event]) -> Result<()> {
    let mut open: Vec<&Event> = Vec::new();
    let mut roots = 0usize;
    let mut previous: Option<&Event> = None;

    for (index, event) in events.iter().enumerate() {
        let at = format!("#{}", index);

        if open.is_empty() {
            if event.kind.is_end() {
                return Err(ViewError::malformed(format!("orphaned {}", event)).at(&at));
            }
            if event.kind == EventKind::Discriminator {
                return Err(
                    ViewError::malformed(format!("discriminator {} outside an object", event))
                        .at(&at),
                );
            }
            roots += 1;
            if roots > 1 {
                return Err(
                    ViewError::malformed(format!("second top-level element {}", event)).at(&at),
                );
            }
        }

        match event.kind {
            EventKind::BeginObject | EventKind::BeginArray => open.push(event),
            EventKind::EndObject | EventKind::EndArray => {
                let top = open.pop().ok_or_else(|| {
                    ViewError::malformed(format!("orphaned {}", event)).at(&at)
                })?;
                if !top.is_closed_by(event) {
                    return Err(
                        ViewError::malformed(format!("{} does not close {}", event, top)).at(&at),
                    );
                }
            }
            EventKind::Discriminator => {
                let first_in_object =
                    matches!(previous, Some(p) if p.kind == EventKind::BeginObject);
                if !first_in_object {
                    return Err(ViewError::malformed(format!(
                        "discriminator {} must be the first child of an object",
                        event
                    ))
                    .at(&at));
                }
            }
            EventKind::Value | EventKind::Url => {}
        }
        previous = Some(event);
    }

    if let Some(top) = open.last() {
        return Err(ViewError::malformed(format!("unterminated {}", top)).at("#end"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_nested_view() {
        let events = vec![
            Event::begin_object(Some("pet")),
            Event::discriminator("@type", "Dog"),
            Event::value(Some("name"), "Rex"),
            Event::begin_array(Some("tags")),
            Event::value(None, "good"),
            Event::end_array(Some("tags")),
            Event::end_object(Some("pet")),
        ];
        assert!(validate(&events).is_ok());
    }

    #[test]
    fn test_accepts_empty_view() {
        assert!(validate(&[]).is_ok());
    }

    #[test]
    fn test_rejects_crossed_nesting() {
        let events = vec![
            Event::begin_object(Some("a")),
            Event::begin_array(Some("b")),
            Event::end_object(Some("a")),
            Event::end_array(Some("b")),
        ];
        let err = validate(&events).unwrap_err();
        assert_eq!(err.path(), Some("#2"));
    }

    #[test]
    fn test_rejects_late_discriminator() {
        let events = vec![
            Event::begin_object(Some("pet")),
            Event::value(Some("name"), "Rex"),
            Event::discriminator("@type", "Dog"),
            Event::end_object(Some("pet")),
        ];
        assert!(validate(&events).is_err());
    }

    #[test]
    fn test_rejects_unterminated_and_orphans() {
        assert!(validate(&[Event::begin_object(Some("a"))]).is_err());
        assert!(validate(&[Event::end_array(Some("a"))]).is_err());
    }

    #[test]
    fn test_rejects_namespace_mismatch() {
        let events = vec![
            Event::begin_object(Some("a")).with_namespace(Some("urn:one")),
            Event::end_object(Some("a")).with_namespace(Some("urn:two")),
        ];
        assert!(validate(&events).is_err());
    }
}
