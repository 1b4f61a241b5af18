//! Response shapes of KorService2 and their mapping onto domain models.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use mytrip_core::{
    model::{
        AreaCode, AreaInfo, ContentId, ContentType, ContentTypeId, IntroCommon, IntroDetails,
        PetTourInfo, TourDetail, TourImage, TourIntro, TourItem,
    },
    ports::PortError,
};

const SUCCESS_CODE: &str = "0000";

/// Outer wrapper of every KorService2 JSON response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: ResponseBody<T>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody<T> {
    header: Header,
    body: Option<Body<T>>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct Body<T> {
    items: Option<Items<T>>,
    #[serde(rename = "totalCount", default)]
    total_count: usize,
}

/// `items` is an object holding `item`, or an empty string when nothing matched.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Items<T> {
    Wrapped { item: OneOrMany<T> },
    Blank(String),
}

/// `item` is an array, or a bare object when exactly one record matched.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Decoded records plus the reported total.
#[derive(Debug)]
pub(crate) struct Decoded<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: usize,
}

/// Parse a response body, rejecting non-success result codes.
pub(crate) fn decode<T: DeserializeOwned>(raw: &str) -> Result<Decoded<T>, PortError> {
    let envelope: Envelope<T> = serde_json::from_str(raw)?;
    let ResponseBody { header, body } = envelope.response;

    if header.result_code != SUCCESS_CODE {
        return Err(PortError::Upstream {
            code: header.result_code,
            message: header.result_msg,
        });
    }

    let Some(body) = body else {
        return Ok(Decoded {
            items: Vec::new(),
            total_count: 0,
        });
    };

    let items = match body.items {
        Some(Items::Wrapped {
            item: OneOrMany::Many(items),
        }) => items,
        Some(Items::Wrapped {
            item: OneOrMany::One(item),
        }) => vec![item],
        Some(Items::Blank(text)) => {
            if !text.is_empty() {
                debug!(items = %text, "ignoring non-list items payload");
            }
            Vec::new()
        }
        None => Vec::new(),
    };

    let total_count = if items.is_empty() { 0 } else { body.total_count };
    Ok(Decoded { items, total_count })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Item of `areaBasedList2` and `searchKeyword2`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTourItem {
    contentid: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    addr1: String,
    addr2: Option<String>,
    #[serde(default)]
    areacode: String,
    #[serde(default)]
    contenttypeid: String,
    mapx: Option<String>,
    mapy: Option<String>,
    modifiedtime: Option<String>,
    firstimage: Option<String>,
    firstimage2: Option<String>,
    tel: Option<String>,
    cat1: Option<String>,
    cat2: Option<String>,
    cat3: Option<String>,
    overview: Option<String>,
}

impl From<RawTourItem> for TourItem {
    fn from(raw: RawTourItem) -> Self {
        TourItem {
            content_id: ContentId(raw.contentid),
            title: raw.title,
            address: raw.addr1,
            address_detail: non_empty(raw.addr2),
            area_code: AreaCode(raw.areacode),
            content_type_id: ContentTypeId(raw.contenttypeid),
            map_x: non_empty(raw.mapx),
            map_y: non_empty(raw.mapy),
            modified_time: non_empty(raw.modifiedtime),
            first_image: non_empty(raw.firstimage),
            first_image_thumb: non_empty(raw.firstimage2),
            tel: non_empty(raw.tel),
            categories: [non_empty(raw.cat1), non_empty(raw.cat2), non_empty(raw.cat3)],
            overview: non_empty(raw.overview),
        }
    }
}

/// Item of `detailCommon2`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawDetail {
    contentid: String,
    #[serde(default)]
    contenttypeid: String,
    #[serde(default)]
    title: String,
    addr1: Option<String>,
    addr2: Option<String>,
    zipcode: Option<String>,
    tel: Option<String>,
    homepage: Option<String>,
    overview: Option<String>,
    firstimage: Option<String>,
    firstimage2: Option<String>,
    mapx: Option<String>,
    mapy: Option<String>,
    createdtime: Option<String>,
    modifiedtime: Option<String>,
}

impl From<RawDetail> for TourDetail {
    fn from(raw: RawDetail) -> Self {
        TourDetail {
            content_id: ContentId(raw.contentid),
            content_type_id: ContentTypeId(raw.contenttypeid),
            title: raw.title,
            address: non_empty(raw.addr1),
            address_detail: non_empty(raw.addr2),
            zipcode: non_empty(raw.zipcode),
            tel: non_empty(raw.tel),
            homepage: non_empty(raw.homepage),
            overview: non_empty(raw.overview),
            first_image: non_empty(raw.firstimage),
            first_image_thumb: non_empty(raw.firstimage2),
            map_x: non_empty(raw.mapx),
            map_y: non_empty(raw.mapy),
            created_time: non_empty(raw.createdtime),
            modified_time: non_empty(raw.modifiedtime),
        }
    }
}

/// Item of `detailIntro2`; field names vary by content type.
#[derive(Debug, Deserialize)]
pub(crate) struct RawIntro {
    contentid: String,
    #[serde(default)]
    contenttypeid: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

/// Remaining intro fields, with blanks dropped and numbers rendered as text.
struct IntroFields(BTreeMap<String, String>);

impl IntroFields {
    fn new(raw: BTreeMap<String, Value>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    Value::Number(number) => number.to_string(),
                    _ => return None,
                };
                let text = text.trim().to_owned();
                (!text.is_empty()).then_some((key, text))
            })
            .collect();
        Self(fields)
    }

    fn take(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    fn take_named(&mut self, key: Option<&str>) -> Option<String> {
        key.and_then(|name| self.take(name))
    }
}

/// `detailIntro2` names of the shared intro fields for one content type.
struct CommonKeys {
    info_center: Option<&'static str>,
    rest_date: Option<&'static str>,
    use_time: Option<&'static str>,
    parking: Option<&'static str>,
    pets: Option<&'static str>,
}

impl CommonKeys {
    const NONE: Self = Self {
        info_center: None,
        rest_date: None,
        use_time: None,
        parking: None,
        pets: None,
    };

    fn for_kind(kind: &ContentType) -> Self {
        match kind {
            ContentType::Attraction => Self {
                info_center: Some("infocenter"),
                rest_date: Some("restdate"),
                use_time: Some("usetime"),
                parking: Some("parking"),
                pets: Some("chkpet"),
            },
            ContentType::Culture => Self {
                info_center: Some("infocenterculture"),
                rest_date: Some("restdateculture"),
                use_time: Some("usetimeculture"),
                parking: Some("parkingculture"),
                pets: Some("chkpetculture"),
            },
            ContentType::Festival => Self {
                info_center: Some("sponsor1tel"),
                use_time: Some("playtime"),
                ..Self::NONE
            },
            ContentType::Course => Self {
                info_center: Some("infocentertourcourse"),
                ..Self::NONE
            },
            ContentType::Leisure => Self {
                info_center: Some("infocenterleports"),
                rest_date: Some("restdateleports"),
                use_time: Some("usetimeleports"),
                parking: Some("parkingleports"),
                pets: Some("chkpetleports"),
            },
            ContentType::Lodging => Self {
                info_center: Some("infocenterlodging"),
                parking: Some("parkinglodging"),
                pets: Some("chkpetlodging"),
                ..Self::NONE
            },
            ContentType::Shopping => Self {
                info_center: Some("infocentershopping"),
                rest_date: Some("restdateshopping"),
                use_time: Some("opentime"),
                parking: Some("parkingshopping"),
                pets: Some("chkpetshopping"),
            },
            ContentType::Restaurant => Self {
                info_center: Some("infocenterfood"),
                rest_date: Some("restdatefood"),
                use_time: Some("opentimefood"),
                parking: Some("parkingfood"),
                pets: Some("chkpetfood"),
            },
            ContentType::Other(_) => Self::NONE,
        }
    }
}

impl From<RawIntro> for TourIntro {
    fn from(raw: RawIntro) -> Self {
        let content_type_id = ContentTypeId(raw.contenttypeid);
        let kind = content_type_id.kind();
        let mut fields = IntroFields::new(raw.fields);

        let keys = CommonKeys::for_kind(&kind);
        let common = IntroCommon {
            info_center: fields.take_named(keys.info_center),
            rest_date: fields.take_named(keys.rest_date),
            use_time: fields.take_named(keys.use_time),
            parking: fields.take_named(keys.parking),
            pets: fields.take_named(keys.pets),
        };

        let details = match kind {
            ContentType::Attraction => IntroDetails::Attraction {
                heritage_culture: fields.take("heritage1"),
                heritage_nature: fields.take("heritage2"),
                heritage_record: fields.take("heritage3"),
            },
            ContentType::Culture => IntroDetails::Culture {
                use_fee: fields.take("usefee"),
                discount_info: fields.take("discountinfo"),
            },
            ContentType::Festival => IntroDetails::Festival {
                event_start: fields.take("eventstartdate"),
                event_end: fields.take("eventenddate"),
                event_place: fields.take("eventplace"),
                use_fee: fields.take("usetimefestival"),
            },
            ContentType::Lodging => IntroDetails::Lodging {
                room_count: fields.take("roomcount"),
                room_type: fields.take("roomtype"),
            },
            ContentType::Restaurant => IntroDetails::Restaurant {
                treat_menu: fields.take("treatmenu"),
            },
            ContentType::Course
            | ContentType::Leisure
            | ContentType::Shopping
            | ContentType::Other(_) => IntroDetails::Other(fields.0),
        };

        TourIntro {
            content_id: ContentId(raw.contentid),
            content_type_id,
            common,
            details,
        }
    }
}

/// Item of `detailImage2`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawImage {
    contentid: String,
    #[serde(alias = "imagename")]
    imgname: Option<String>,
    originimgurl: Option<String>,
    smallimageurl: Option<String>,
    serialnum: Option<String>,
}

impl From<RawImage> for TourImage {
    fn from(raw: RawImage) -> Self {
        TourImage {
            content_id: ContentId(raw.contentid),
            name: non_empty(raw.imgname),
            origin_url: non_empty(raw.originimgurl),
            small_url: non_empty(raw.smallimageurl),
            serial: non_empty(raw.serialnum),
        }
    }
}

/// Item of `detailPetTour2`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPetInfo {
    contentid: String,
    chkpetleash: Option<String>,
    chkpetsize: Option<String>,
    chkpetplace: Option<String>,
    chkpetfee: Option<String>,
    petinfo: Option<String>,
    parking: Option<String>,
}

impl From<RawPetInfo> for PetTourInfo {
    fn from(raw: RawPetInfo) -> Self {
        PetTourInfo {
            content_id: ContentId(raw.contentid),
            leash: non_empty(raw.chkpetleash),
            size: non_empty(raw.chkpetsize),
            places: non_empty(raw.chkpetplace),
            fee: non_empty(raw.chkpetfee),
            info: non_empty(raw.petinfo),
            parking: non_empty(raw.parking),
        }
    }
}

/// Item of `areaCode2`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawArea {
    code: String,
    name: String,
}

impl From<RawArea> for AreaInfo {
    fn from(raw: RawArea) -> Self {
        AreaInfo {
            code: AreaCode(raw.code),
            name: raw.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_item_arrays_with_total() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":{"item":[
                {"contentid":"100","title":"서울숲","addr1":"서울특별시 성동구","addr2":"",
                 "areacode":"1","contenttypeid":"12","mapx":"127.0374","mapy":"37.5443",
                 "modifiedtime":"20241101093000","firstimage":"","tel":"02-460-2905"},
                {"contentid":"200","title":"남산타워","addr1":"서울특별시 용산구",
                 "areacode":"1","contenttypeid":"12","mapx":"","mapy":"37.55",
                 "modifiedtime":"20241015091500"}
            ]},"numOfRows":20,"pageNo":1,"totalCount":57}}}"#;

        let decoded = decode::<RawTourItem>(raw).expect("payload should decode");
        assert_eq!(decoded.total_count, 57);

        let items: Vec<TourItem> = decoded.items.into_iter().map(TourItem::from).collect();
        let first = items.first().expect("first item");
        assert_eq!(first.content_id.as_str(), "100");
        assert_eq!(first.address_detail, None);
        assert_eq!(first.first_image, None);
        assert_eq!(first.tel.as_deref(), Some("02-460-2905"));
        assert!(first.coordinates().is_some(), "coordinates should parse");

        let second = items.get(1).expect("second item");
        assert_eq!(second.coordinates(), None);
    }

    #[test]
    fn decodes_single_object_item() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":{"item":{"contentid":"2994101","contenttypeid":"12",
            "title":"테스트 관광지","addr1":"서울특별시","mapx":"0","mapy":"0"}},
            "totalCount":1}}}"#;

        let decoded = decode::<RawDetail>(raw).expect("payload should decode");
        let details: Vec<TourDetail> = decoded.items.into_iter().map(TourDetail::from).collect();
        assert_eq!(details.len(), 1);
        assert_eq!(
            details.first().map(|detail| detail.title.as_str()),
            Some("테스트 관광지")
        );
    }

    #[test]
    fn empty_items_string_means_no_results() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":"","numOfRows":20,"pageNo":1,"totalCount":0}}}"#;

        let decoded = decode::<RawTourItem>(raw).expect("payload should decode");
        assert!(decoded.items.is_empty(), "no items expected");
        assert_eq!(decoded.total_count, 0);
    }

    #[test]
    fn missing_items_report_zero_total() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"numOfRows":20,"pageNo":9,"totalCount":57}}}"#;

        let decoded = decode::<RawTourItem>(raw).expect("payload should decode");
        assert!(decoded.items.is_empty(), "no items expected");
        assert_eq!(decoded.total_count, 0);
    }

    #[test]
    fn non_success_code_is_upstream_error() {
        let raw = r#"{"response":{"header":{"resultCode":"30","resultMsg":"SERVICE KEY IS NOT REGISTERED ERROR."}}}"#;

        match decode::<RawTourItem>(raw) {
            Err(PortError::Upstream { code, message }) => {
                assert_eq!(code, "30");
                assert!(message.contains("SERVICE KEY"), "message should be forwarded");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_payload_is_decode_error() {
        assert!(
            matches!(decode::<RawTourItem>("<OpenAPI_ServiceResponse>"), Err(PortError::Decode(_))),
            "xml error pages should not decode"
        );
    }

    #[test]
    fn intro_splits_common_and_type_specific_fields() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":{"item":{"contentid":"1","contenttypeid":"14",
            "infocenterculture":"02-123-4567","usetimeculture":"09:00~18:00",
            "restdateculture":"월요일","parkingculture":"","chkpetculture":"불가",
            "usefee":"무료","discountinfo":"","scale":"1000"}},"totalCount":1}}}"#;

        let decoded = decode::<RawIntro>(raw).expect("payload should decode");
        let intro = decoded
            .items
            .into_iter()
            .map(TourIntro::from)
            .next()
            .expect("intro item");

        assert_eq!(intro.common.info_center.as_deref(), Some("02-123-4567"));
        assert_eq!(intro.common.use_time.as_deref(), Some("09:00~18:00"));
        assert_eq!(intro.common.rest_date.as_deref(), Some("월요일"));
        assert_eq!(intro.common.parking, None);
        assert_eq!(intro.common.pets.as_deref(), Some("불가"));
        assert_eq!(
            intro.details,
            IntroDetails::Culture {
                use_fee: Some("무료".to_owned()),
                discount_info: None,
            }
        );
    }

    #[test]
    fn intro_for_unmodelled_type_keeps_remaining_fields() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":{"item":{"contentid":"2","contenttypeid":"25",
            "distance":"12km","taketime":"","schedule":"1일"}},"totalCount":1}}}"#;

        let decoded = decode::<RawIntro>(raw).expect("payload should decode");
        let intro = decoded
            .items
            .into_iter()
            .map(TourIntro::from)
            .next()
            .expect("intro item");

        let IntroDetails::Other(fields) = intro.details else {
            panic!("course intro should keep raw fields");
        };
        assert_eq!(fields.get("distance").map(String::as_str), Some("12km"));
        assert_eq!(fields.get("schedule").map(String::as_str), Some("1일"));
        assert!(!fields.contains_key("taketime"), "blank fields are dropped");
    }

    #[test]
    fn festival_fee_is_not_read_as_opening_hours() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":{"item":{"contentid":"3","contenttypeid":"15",
            "sponsor1tel":"02-2290-6114","playtime":"10:00~22:00",
            "usetimefestival":"무료","eventstartdate":"20250501",
            "eventenddate":"20250505","eventplace":"서울숲"}},"totalCount":1}}}"#;

        let decoded = decode::<RawIntro>(raw).expect("payload should decode");
        let intro = decoded
            .items
            .into_iter()
            .map(TourIntro::from)
            .next()
            .expect("intro item");

        assert_eq!(intro.common.info_center.as_deref(), Some("02-2290-6114"));
        assert_eq!(intro.common.use_time.as_deref(), Some("10:00~22:00"));
        assert_eq!(
            intro.details,
            IntroDetails::Festival {
                event_start: Some("20250501".to_owned()),
                event_end: Some("20250505".to_owned()),
                event_place: Some("서울숲".to_owned()),
                use_fee: Some("무료".to_owned()),
            }
        );
    }

    #[test]
    fn leisure_parking_fee_stays_out_of_parking() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":{"item":{"contentid":"4","contenttypeid":"28",
            "infocenterleports":"033-123-4567","parkingfeeleports":"3,000원",
            "parkingleports":"가능","usefeeleports":"성인 10,000원",
            "usetimeleports":"09:00~17:00"}},"totalCount":1}}}"#;

        let decoded = decode::<RawIntro>(raw).expect("payload should decode");
        let intro = decoded
            .items
            .into_iter()
            .map(TourIntro::from)
            .next()
            .expect("intro item");

        assert_eq!(intro.common.parking.as_deref(), Some("가능"));
        assert_eq!(intro.common.use_time.as_deref(), Some("09:00~17:00"));
        let IntroDetails::Other(fields) = intro.details else {
            panic!("leisure intro should keep raw fields");
        };
        assert_eq!(fields.get("parkingfeeleports").map(String::as_str), Some("3,000원"));
        assert_eq!(fields.get("usefeeleports").map(String::as_str), Some("성인 10,000원"));
    }

    #[test]
    fn image_accepts_both_name_spellings() {
        let raw = r#"{"response":{"header":{"resultCode":"0000","resultMsg":"OK"},
            "body":{"items":{"item":[
                {"contentid":"1","imgname":"전경","originimgurl":"http://a/1.jpg","serialnum":"1_1"},
                {"contentid":"1","imagename":"야경","smallimageurl":"http://a/2s.jpg"}
            ]},"totalCount":2}}}"#;

        let decoded = decode::<RawImage>(raw).expect("payload should decode");
        let names: Vec<Option<String>> = decoded
            .items
            .into_iter()
            .map(|raw_image| TourImage::from(raw_image).name)
            .collect();
        assert_eq!(names, vec![Some("전경".to_owned()), Some("야경".to_owned())]);
    }
}
