use bson::Document;

use super::types::FieldMode;

pub struct FilterSelect;

impl FilterSelect {
    /// Build a projection from a comma separated field list.
    /// `-field` excludes, anything else includes; later entries overwrite earlier ones.
    pub fn parse(raw: Option<&str>) -> Document {
        let mut projection = Document::new();
        let Some(raw) = raw else { return projection };

        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let (field, mode) = match token.strip_prefix('-') {
                Some(rest) => (rest.trim(), FieldMode::Exclude),
                None => (token, FieldMode::Include),
            };
            if field.is_empty() {
                continue;
            }
            projection.insert(field, mode.flag());
        }

        projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn include_and_exclude() {
        assert_eq!(FilterSelect::parse(Some("name,-age")), doc! { "name": 1, "age": 0 });
    }

    #[test]
    fn trims_and_skips_empty_tokens() {
        assert_eq!(FilterSelect::parse(Some(" name , ,email,")), doc! { "name": 1, "email": 1 });
        assert!(FilterSelect::parse(Some("")).is_empty());
        assert!(FilterSelect::parse(None).is_empty());
    }

    #[test]
    fn last_occurrence_wins() {
        let projection = FilterSelect::parse(Some("name,-name"));
        assert_eq!(projection, doc! { "name": 0 });
    }

    #[test]
    fn lone_dash_is_ignored() {
        assert_eq!(FilterSelect::parse(Some("-,title")), doc! { "title": 1 });
    }
}
