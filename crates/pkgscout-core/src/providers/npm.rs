// npm provider - bridges the registry client with the SearchProvider trait
use async_trait::async_trait;
use pkgscout_api::{NpmClient, NpmPackage, NpmSearchResponse};
use std::time::Duration;

use crate::{
    models::Package,
    search::{SearchPage, SearchProvider},
    Result,
};

/// Wrapper around NpmClient that implements SearchProvider
pub struct NpmProvider {
    client: NpmClient,
}

impl NpmProvider {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: NpmClient::with_base_url(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl SearchProvider for NpmProvider {
    async fn search_page(&self, query: &str, size: u32, from: u32) -> Result<SearchPage> {
        let response = self.client.search(query, size, from).await?;
        Ok(response_to_page(response))
    }
}

fn response_to_page(response: NpmSearchResponse) -> SearchPage {
    SearchPage {
        packages: response
            .objects
            .into_iter()
            .map(|obj| npm_to_package(obj.package))
            .collect(),
        total: response.total,
    }
}

/// Convert an npm API package into our Package model
fn npm_to_package(pkg: NpmPackage) -> Package {
    Package {
        name: pkg.name,
        version: pkg.version,
        description: pkg.description.unwrap_or_default(),
        npm_url: pkg.links.npm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgscout_api::npm::parse_search_response;

    #[test]
    fn test_response_keeps_registry_order() {
        let body = br#"{
            "objects": [
                {"package": {"name": "lodash", "version": "4.17.21", "description": "Lodash modular utilities."}},
                {"package": {"name": "lodash-es", "version": "4.17.21"}},
                {"package": {"name": "lodash.get", "version": "4.4.2", "links": {"npm": "https://www.npmjs.com/package/lodash.get"}}}
            ],
            "total": 3
        }"#;

        let page = response_to_page(parse_search_response(body).unwrap());
        let names: Vec<_> = page.packages.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["lodash", "lodash-es", "lodash.get"]);
        assert_eq!(page.total, Some(3));
        assert_eq!(page.packages[1].description, "");
        assert_eq!(
            page.packages[2].npm_url.as_deref(),
            Some("https://www.npmjs.com/package/lodash.get")
        );
    }
}
