use bson::Document;

use crate::config::FilterConfig;

use super::error::FilterError;
use super::filter_page::FilterPage;
use super::filter_select::FilterSelect;
use super::filter_where::FilterWhere;
use super::types::{FilterData, ListParams, PageWindow};

/// Translates list-request query parameters into a store query
pub struct Filter<'a> {
    config: &'a FilterConfig,
    where_data: Document,
    projection: Document,
    window: PageWindow,
}

impl<'a> Filter<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self {
            config,
            where_data: Document::new(),
            projection: Document::new(),
            window: FilterPage::resolve(None, None, config.default_limit),
        }
    }

    /// One-shot translation of a listing request
    pub fn translate(params: &ListParams, config: &'a FilterConfig) -> Result<FilterData, FilterError> {
        let mut filter = Self::new(config);
        filter.assign(params)?;
        Ok(filter.into_data())
    }

    pub fn assign(&mut self, params: &ListParams) -> Result<&mut Self, FilterError> {
        self.where_clause(params.query.as_deref())?;
        self.select(params.fields.as_deref());
        self.paginate(params.page.as_deref(), params.limit.as_deref());
        Ok(self)
    }

    pub fn where_clause(&mut self, raw: Option<&str>) -> Result<&mut Self, FilterError> {
        let mut conditions = FilterWhere::parse(raw)?;
        if self.config.coerce_object_ids {
            FilterWhere::coerce_object_id(&mut conditions)?;
        }
        self.where_data = conditions;
        Ok(self)
    }

    pub fn select(&mut self, raw: Option<&str>) -> &mut Self {
        self.projection = FilterSelect::parse(raw);
        self
    }

    pub fn paginate(&mut self, page: Option<&str>, limit: Option<&str>) -> &mut Self {
        let window = FilterPage::resolve(page, limit, self.config.default_limit);

        // Apply max limit from config
        self.window = match self.config.max_limit {
            Some(max) if window.limit > max => {
                if self.config.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", window.limit, max);
                }
                FilterPage::cap(window, max)
            }
            _ => window,
        };
        self
    }

    pub fn into_data(self) -> FilterData {
        FilterData {
            filter: self.where_data,
            projection: self.projection,
            window: self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, Bson};

    fn config() -> FilterConfig {
        FilterConfig {
            default_limit: 10,
            max_limit: None,
            coerce_object_ids: true,
            debug_logging: false,
        }
    }

    fn params(query: Option<&str>, fields: Option<&str>, page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            query: query.map(String::from),
            fields: fields.map(String::from),
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn empty_request_matches_everything() {
        let cfg = config();
        let data = Filter::translate(&ListParams::default(), &cfg).unwrap();
        assert!(data.filter.is_empty());
        assert!(data.projection.is_empty());
        assert_eq!(data.window, PageWindow { page: 1, limit: 10, skip: 0 });
    }

    #[test]
    fn full_request_translates_every_part() {
        let cfg = config();
        let data = Filter::translate(
            &params(Some(r#"{"color":"red","size":{"$gt":3}}"#), Some("name,-age"), Some("2"), Some("5")),
            &cfg,
        )
        .unwrap();

        assert_eq!(data.filter, doc! { "color": "red", "size": { "$gt": 3 } });
        assert_eq!(data.projection, doc! { "name": 1, "age": 0 });
        assert_eq!(data.window.skip, 5);
        assert_eq!(data.window.limit, 5);
    }

    #[test]
    fn filter_round_trips_plain_json() {
        let cfg = config();
        let raw = r#"{"a":1,"b":[true,null,"x"],"c":{"d":2.5}}"#;
        let data = Filter::translate(&params(Some(raw), None, None, None), &cfg).unwrap();
        let expected: serde_json::Value = serde_json::from_str(raw).unwrap();
        let actual = Bson::Document(data.filter).into_relaxed_extjson();
        assert_eq!(actual, expected);
    }

    #[test]
    fn string_id_validation_respects_config() {
        let mut cfg = config();
        let request = params(Some(r#"{"_id":"nope"}"#), None, None, None);
        assert!(matches!(
            Filter::translate(&request, &cfg),
            Err(FilterError::InvalidIdentifier(_))
        ));

        cfg.coerce_object_ids = false;
        let data = Filter::translate(&request, &cfg).unwrap();
        assert_eq!(data.filter, doc! { "_id": "nope" });
    }

    #[test]
    fn max_limit_caps_window() {
        let mut cfg = config();
        cfg.max_limit = Some(25);
        let data = Filter::translate(&params(None, None, Some("3"), Some("100")), &cfg).unwrap();
        assert_eq!(data.window, PageWindow { page: 3, limit: 25, skip: 50 });
    }

    #[test]
    fn builder_methods_chain() {
        let cfg = config();
        let mut filter = Filter::new(&cfg);
        filter.where_clause(Some(r#"{"x":1}"#)).unwrap().select(Some("x")).paginate(Some("4"), None);
        let data = filter.into_data();
        assert_eq!(data.window.skip, 30);
        assert_eq!(data.projection, doc! { "x": 1 });
    }
}
