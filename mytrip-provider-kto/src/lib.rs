//! Provider implementation for the Korea Tourism Organization `KorService2` API.

mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use mytrip_core::{
    backend::{BackendMeta, TourBackend},
    model::{
        AreaCode, AreaInfo, ContentId, ContentTypeId, PetTourInfo, TourDetail, TourImage,
        TourIntro, TourItem,
    },
    ports::{PortError, TourDetailPort, TourListPort, TourPage, TourQuery},
};

use crate::wire::{Decoded, RawArea, RawDetail, RawImage, RawIntro, RawPetInfo, RawTourItem};

/// Public endpoint of `KorService2`.
pub const BASE_URL: &str = "https://apis.data.go.kr/B551011/KorService2";

const AREA_LIST: &str = "areaBasedList2";
const KEYWORD_SEARCH: &str = "searchKeyword2";
const DETAIL_COMMON: &str = "detailCommon2";
const DETAIL_INTRO: &str = "detailIntro2";
const DETAIL_IMAGE: &str = "detailImage2";
const DETAIL_PET: &str = "detailPetTour2";
const AREA_CODES: &str = "areaCode2";

/// Upper bound on area codes returned by one lookup.
const AREA_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
/// Connection settings for `KorService2`.
pub struct KtoConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Decoded service key issued by data.go.kr.
    pub service_key: String,
    /// Value of the `MobileOS` parameter.
    pub mobile_os: String,
    /// Value of the `MobileApp` parameter.
    pub mobile_app: String,
}

impl KtoConfig {
    /// Default settings against the public endpoint.
    #[must_use]
    pub fn new(service_key: impl Into<String>) -> Self {
        Self {
            base_url: BASE_URL.to_owned(),
            service_key: service_key.into(),
            mobile_os: "ETC".to_owned(),
            mobile_app: "MyTrip".to_owned(),
        }
    }
}

/// Shared request plumbing for both ports.
struct KtoApi {
    client: Client,
    config: KtoConfig,
}

impl KtoApi {
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// GET request for `endpoint` with the common parameters already attached.
    fn request(&self, endpoint: &str) -> RequestBuilder {
        self.client.get(self.endpoint_url(endpoint)).query(&[
            ("serviceKey", self.config.service_key.as_str()),
            ("MobileOS", self.config.mobile_os.as_str()),
            ("MobileApp", self.config.mobile_app.as_str()),
            ("_type", "json"),
        ])
    }

    fn list_request(&self, query: &TourQuery) -> RequestBuilder {
        let filters = &query.filters;
        let mut req = match filters.keyword() {
            Some(keyword) => self.request(KEYWORD_SEARCH).query(&[("keyword", keyword)]),
            None => self.request(AREA_LIST),
        };

        req = req.query(&[("numOfRows", query.page_size), ("pageNo", query.page)]);

        if let Some(area_code) = filters.area_code.as_ref() {
            req = req.query(&[("areaCode", area_code.as_str())]);
        }
        if let Some(content_type) = filters.content_type.as_ref() {
            req = req.query(&[("contentTypeId", content_type.as_str())]);
        }

        req
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: RequestBuilder,
    ) -> Result<Decoded<T>, PortError> {
        debug!(endpoint, "requesting tour api");
        let body = fetch_text(req).await?;
        let decoded = wire::decode::<T>(&body)?;
        debug!(
            endpoint,
            items = decoded.items.len(),
            total = decoded.total_count,
            "tour api responded"
        );
        Ok(decoded)
    }

    async fn fetch_first<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: RequestBuilder,
    ) -> Result<Option<T>, PortError> {
        Ok(self.fetch::<T>(endpoint, req).await?.items.into_iter().next())
    }
}

/// List and keyword search implementation.
pub struct KtoListPort {
    api: Arc<KtoApi>,
}

#[async_trait]
impl TourListPort for KtoListPort {
    #[instrument(skip_all, fields(page = query.page, keyword = query.is_keyword_search()))]
    async fn list(&self, query: &TourQuery) -> Result<TourPage, PortError> {
        let endpoint = if query.is_keyword_search() {
            KEYWORD_SEARCH
        } else {
            AREA_LIST
        };
        let decoded = self
            .api
            .fetch::<RawTourItem>(endpoint, self.api.list_request(query))
            .await?;

        Ok(TourPage {
            items: decoded.items.into_iter().map(TourItem::from).collect(),
            total_count: decoded.total_count,
        })
    }
}

/// Detail lookup implementation.
pub struct KtoDetailPort {
    api: Arc<KtoApi>,
}

#[async_trait]
impl TourDetailPort for KtoDetailPort {
    async fn detail(&self, content_id: &ContentId) -> Result<Option<TourDetail>, PortError> {
        let req = self
            .api
            .request(DETAIL_COMMON)
            .query(&[("contentId", content_id.as_str())]);
        let detail = self.api.fetch_first::<RawDetail>(DETAIL_COMMON, req).await?;
        Ok(detail.map(TourDetail::from))
    }

    async fn intro(
        &self,
        content_id: &ContentId,
        content_type: &ContentTypeId,
    ) -> Result<Option<TourIntro>, PortError> {
        let req = self.api.request(DETAIL_INTRO).query(&[
            ("contentId", content_id.as_str()),
            ("contentTypeId", content_type.as_str()),
        ]);
        let intro = self.api.fetch_first::<RawIntro>(DETAIL_INTRO, req).await?;
        Ok(intro.map(TourIntro::from))
    }

    async fn images(&self, content_id: &ContentId) -> Result<Vec<TourImage>, PortError> {
        let req = self
            .api
            .request(DETAIL_IMAGE)
            .query(&[("contentId", content_id.as_str())]);
        let decoded = self.api.fetch::<RawImage>(DETAIL_IMAGE, req).await?;
        Ok(decoded.items.into_iter().map(TourImage::from).collect())
    }

    async fn pet_info(&self, content_id: &ContentId) -> Result<Option<PetTourInfo>, PortError> {
        let req = self
            .api
            .request(DETAIL_PET)
            .query(&[("contentId", content_id.as_str())]);
        let info = self.api.fetch_first::<RawPetInfo>(DETAIL_PET, req).await?;
        Ok(info.map(PetTourInfo::from))
    }

    async fn areas(&self, parent: Option<&AreaCode>) -> Result<Vec<AreaInfo>, PortError> {
        let mut req = self
            .api
            .request(AREA_CODES)
            .query(&[("numOfRows", AREA_PAGE_SIZE)]);
        if let Some(parent) = parent {
            req = req.query(&[("areaCode", parent.as_str())]);
        }
        let decoded = self.api.fetch::<RawArea>(AREA_CODES, req).await?;
        Ok(decoded.items.into_iter().map(AreaInfo::from).collect())
    }
}

/// Build the backend bundle for `KorService2`.
#[must_use]
pub fn backend(client: Client, config: KtoConfig) -> TourBackend {
    let api = Arc::new(KtoApi { client, config });

    TourBackend {
        meta: backend_meta(),
        list_port: Arc::new(KtoListPort {
            api: Arc::clone(&api),
        }),
        detail_port: Arc::new(KtoDetailPort { api }),
    }
}

fn backend_meta() -> BackendMeta {
    BackendMeta {
        id: String::from("kto"),
        name: String::from("한국관광공사 KorService2"),
    }
}

// Body of a successful response; HTTP error statuses become `PortError::Network`.
async fn fetch_text(req: RequestBuilder) -> Result<String, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .text()
        .await
        .map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use mytrip_core::ports::SearchFilters;

    use super::*;

    fn api() -> KtoApi {
        KtoApi {
            client: Client::new(),
            config: KtoConfig::new("TESTKEY"),
        }
    }

    fn url_of(req: RequestBuilder) -> String {
        req.build().expect("request should build").url().to_string()
    }

    #[test]
    fn detail_url_has_no_double_slash() {
        let api = api();
        let req = api
            .request("/detailCommon2")
            .query(&[("contentId", "2994101")]);
        assert_eq!(
            url_of(req),
            "https://apis.data.go.kr/B551011/KorService2/detailCommon2?serviceKey=TESTKEY&MobileOS=ETC&MobileApp=MyTrip&_type=json&contentId=2994101"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let mut api = api();
        api.config.base_url = "http://localhost:3000/api/tour/".to_owned();
        assert_eq!(
            api.endpoint_url("areaCode2"),
            "http://localhost:3000/api/tour/areaCode2"
        );
    }

    #[test]
    fn area_list_query_carries_filters() {
        let query = TourQuery::new(
            SearchFilters {
                area_code: Some(AreaCode::from("6")),
                content_type: Some(ContentTypeId::from("12")),
                keyword: String::new(),
            },
            20,
            3,
        );
        let url = url_of(api().list_request(&query));
        assert!(url.contains("/areaBasedList2?"), "wrong endpoint: {url}");
        assert!(url.contains("numOfRows=20&pageNo=3"), "paging missing: {url}");
        assert!(url.contains("areaCode=6"), "area missing: {url}");
        assert!(url.contains("contentTypeId=12"), "type missing: {url}");
        assert!(!url.contains("keyword="), "unexpected keyword: {url}");
    }

    #[test]
    fn keyword_query_uses_search_endpoint() {
        let query = TourQuery::new(
            SearchFilters {
                keyword: "  해운대 ".to_owned(),
                ..SearchFilters::default()
            },
            10,
            1,
        );
        let req = api().list_request(&query);
        let built = req.build().expect("request should build");
        assert!(built.url().path().ends_with("/searchKeyword2"), "wrong endpoint");
        let keyword = built
            .url()
            .query_pairs()
            .find(|(key, _)| key == "keyword")
            .map(|(_, value)| value.into_owned());
        assert_eq!(keyword.as_deref(), Some("해운대"));
        assert!(
            !built.url().query_pairs().any(|(key, _)| key == "areaCode"),
            "no area filter expected"
        );
    }
}
