//! ID generation handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use rand::Rng;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::domain::{ApiResponse, GenerateIdsResponse, ParsedIdResponse};
use crate::error::{AppError, Result};

/// Query parameters for ID generation.
///
/// Values are kept as strings so malformed input maps to an API error
/// instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    /// Comma separated domains (default: one random domain).
    pub domains: Option<String>,

    /// Number of IDs per domain (default: 1).
    pub count: Option<String>,
}

impl GenerateQuery {
    /// Parse and validate `count`.
    fn count(&self, max_count: usize) -> Result<usize> {
        let Some(raw) = self.count.as_deref() else {
            return Ok(1);
        };

        let count: usize = raw
            .trim()
            .parse()
            .ok()
            .filter(|&count| count > 0)
            .ok_or_else(|| {
                AppError::InvalidParam(format!("count must be a positive integer, got '{raw}'"))
            })?;

        if count > max_count {
            return Err(AppError::InvalidParam(format!(
                "count cannot exceed {max_count}"
            )));
        }

        Ok(count)
    }

    /// Parse and validate `domains`, picking a random one when absent.
    fn domains(&self, max_domain: u64) -> Result<Vec<u64>> {
        let Some(raw) = self.domains.as_deref() else {
            return Ok(vec![rand::rng().random_range(0..=max_domain)]);
        };

        raw.split(',')
            .map(|part| {
                let domain: u64 = part.trim().parse().map_err(|_| {
                    AppError::InvalidParam(format!("domain '{part}' is not an unsigned integer"))
                })?;
                if domain > max_domain {
                    return Err(AppError::DomainOutOfRange {
                        domain,
                        max: max_domain,
                    });
                }
                Ok(domain)
            })
            .collect()
    }
}

/// Query parameters for ID parsing.
#[derive(Debug, Default, Deserialize)]
pub struct ParseQuery {
    /// ID to decode.
    pub id: Option<String>,
}

impl ParseQuery {
    fn id(&self) -> Result<u64> {
        let raw = self
            .id
            .as_deref()
            .ok_or_else(|| AppError::MissingParam("id".to_string()))?;

        raw.trim().parse().map_err(|_| {
            AppError::InvalidParam(format!("id '{raw}' is not an unsigned 64-bit integer"))
        })
    }
}

/// Generate IDs for one or more domains.
pub async fn generate(
    State(state): State<AppState>,
    query: std::result::Result<Query<GenerateQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<GenerateIdsResponse>>> {
    metrics::counter!("idgen_requests_total", "endpoint" => "generate").increment(1);

    let Query(query) = query?;
    let count = query.count(state.config.server.max_count)?;
    let domains = query.domains(state.generator.max_domain())?;

    let ids = state.generator.generate_many(&domains, count).await?;

    Ok(Json(ApiResponse::success(GenerateIdsResponse::from(ids))))
}

/// Decode an ID into its components.
pub async fn parse(
    State(state): State<AppState>,
    query: std::result::Result<Query<ParseQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ParsedIdResponse>>> {
    metrics::counter!("idgen_requests_total", "endpoint" => "parse").increment(1);

    let Query(query) = query?;
    let id = query.id()?;
    let components = state.generator.decode(id);

    Ok(Json(ApiResponse::success(ParsedIdResponse::from(components))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_query(domains: Option<&str>, count: Option<&str>) -> GenerateQuery {
        GenerateQuery {
            domains: domains.map(str::to_string),
            count: count.map(str::to_string),
        }
    }

    #[test]
    fn test_count_defaults_to_one() {
        assert_eq!(generate_query(None, None).count(1000).unwrap(), 1);
        assert_eq!(generate_query(None, Some("25")).count(1000).unwrap(), 25);
    }

    #[test]
    fn test_count_must_be_positive_integer() {
        for raw in ["0", "-3", "abc", "", "1.5"] {
            let err = generate_query(None, Some(raw)).count(1000).unwrap_err();
            assert!(matches!(err, AppError::InvalidParam(_)), "{raw}");
        }
        let err = generate_query(None, Some("1001")).count(1000).unwrap_err();
        assert!(matches!(err, AppError::InvalidParam(_)));
    }

    #[test]
    fn test_domains_parsing() {
        let domains = generate_query(Some("1, 7,3"), None).domains(255).unwrap();
        assert_eq!(domains, vec![1, 7, 3]);

        let err = generate_query(Some("1,x"), None).domains(255).unwrap_err();
        assert!(matches!(err, AppError::InvalidParam(_)));

        let err = generate_query(Some(""), None).domains(255).unwrap_err();
        assert!(matches!(err, AppError::InvalidParam(_)));

        let err = generate_query(Some("1,256"), None).domains(255).unwrap_err();
        assert!(matches!(
            err,
            AppError::DomainOutOfRange {
                domain: 256,
                max: 255
            }
        ));
    }

    #[test]
    fn test_random_domain_in_range() {
        for _ in 0..100 {
            let domains = generate_query(None, None).domains(3).unwrap();
            assert_eq!(domains.len(), 1);
            assert!(domains[0] <= 3);
        }
    }

    #[test]
    fn test_parse_query() {
        let query = ParseQuery {
            id: Some("391531634640137".to_string()),
        };
        assert_eq!(query.id().unwrap(), 391_531_634_640_137);

        assert!(matches!(
            ParseQuery::default().id().unwrap_err(),
            AppError::MissingParam(_)
        ));

        for raw in ["-1", "18446744073709551616", "abc"] {
            let query = ParseQuery {
                id: Some(raw.to_string()),
            };
            assert!(matches!(query.id().unwrap_err(), AppError::InvalidParam(_)));
        }
    }
}
