//! Domain data structures for tour items, detail records, and bookmarks.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used when an item carries no modification timestamp.
pub const DEFAULT_MODIFIED_TIME: &str = "00000000000000";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Stable identifier of a point of interest.
pub struct ContentId(pub String);

impl ContentId {
    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(raw: &str) -> Self {
        ContentId(raw.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Top-level region code such as `1` for Seoul.
pub struct AreaCode(pub String);

impl AreaCode {
    /// Borrow the raw code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Korean label of a built-in area, if the code is known.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        AREAS
            .iter()
            .find(|area| area.code == self.0)
            .map(|area| area.name)
    }
}

impl From<&str> for AreaCode {
    fn from(raw: &str) -> Self {
        AreaCode(raw.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Raw content type classification code as returned by the API.
pub struct ContentTypeId(pub String);

impl ContentTypeId {
    /// Borrow the raw code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the code as a known content type.
    #[must_use]
    pub fn kind(&self) -> ContentType {
        ContentType::from_code(&self.0)
    }
}

impl From<&str> for ContentTypeId {
    fn from(raw: &str) -> Self {
        ContentTypeId(raw.to_owned())
    }
}

impl From<ContentType> for ContentTypeId {
    fn from(kind: ContentType) -> Self {
        ContentTypeId(kind.code().to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Content type classifications used by the tourism API.
pub enum ContentType {
    /// Tourist attraction (12).
    Attraction,
    /// Cultural facility (14).
    Culture,
    /// Festival or event (15).
    Festival,
    /// Travel course (25).
    Course,
    /// Leisure sports (28).
    Leisure,
    /// Lodging (32).
    Lodging,
    /// Shopping (38).
    Shopping,
    /// Restaurant (39).
    Restaurant,
    /// Code not known to this client.
    Other(String),
}

impl ContentType {
    /// Every known content type in API order.
    pub const KNOWN: [ContentType; 8] = [
        ContentType::Attraction,
        ContentType::Culture,
        ContentType::Festival,
        ContentType::Course,
        ContentType::Leisure,
        ContentType::Lodging,
        ContentType::Shopping,
        ContentType::Restaurant,
    ];

    /// Parse a raw classification code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "12" => ContentType::Attraction,
            "14" => ContentType::Culture,
            "15" => ContentType::Festival,
            "25" => ContentType::Course,
            "28" => ContentType::Leisure,
            "32" => ContentType::Lodging,
            "38" => ContentType::Shopping,
            "39" => ContentType::Restaurant,
            other => ContentType::Other(other.to_owned()),
        }
    }

    /// Raw classification code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            ContentType::Attraction => "12",
            ContentType::Culture => "14",
            ContentType::Festival => "15",
            ContentType::Course => "25",
            ContentType::Leisure => "28",
            ContentType::Lodging => "32",
            ContentType::Shopping => "38",
            ContentType::Restaurant => "39",
            ContentType::Other(code) => code.as_str(),
        }
    }

    /// Korean display name.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            ContentType::Attraction => "관광지",
            ContentType::Culture => "문화시설",
            ContentType::Festival => "축제/행사",
            ContentType::Course => "여행코스",
            ContentType::Leisure => "레포츠",
            ContentType::Lodging => "숙박",
            ContentType::Shopping => "쇼핑",
            ContentType::Restaurant => "음식점",
            ContentType::Other(code) => code.as_str(),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Built-in top-level area with its Korean label.
pub struct Area {
    /// API area code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
}

/// Top-level areas offered as list filters.
pub const AREAS: [Area; 17] = [
    Area { code: "1", name: "서울" },
    Area { code: "2", name: "인천" },
    Area { code: "3", name: "대전" },
    Area { code: "4", name: "대구" },
    Area { code: "5", name: "광주" },
    Area { code: "6", name: "부산" },
    Area { code: "7", name: "울산" },
    Area { code: "8", name: "세종" },
    Area { code: "31", name: "경기" },
    Area { code: "32", name: "강원" },
    Area { code: "33", name: "충북" },
    Area { code: "34", name: "충남" },
    Area { code: "35", name: "경북" },
    Area { code: "36", name: "경남" },
    Area { code: "37", name: "전북" },
    Area { code: "38", name: "전남" },
    Area { code: "39", name: "제주" },
];

#[derive(Debug, Clone, Copy, PartialEq)]
/// WGS84 position of a point of interest.
pub struct Coordinates {
    /// Longitude (`mapx`).
    pub lng: f64,
    /// Latitude (`mapy`).
    pub lat: f64,
}

/// Parse string-encoded coordinates.
///
/// Missing, blank, non-numeric, or non-finite values yield `None`.
#[must_use]
pub fn parse_coordinates(map_x: Option<&str>, map_y: Option<&str>) -> Option<Coordinates> {
    let lng = parse_axis(map_x?)?;
    let lat = parse_axis(map_y?)?;
    Some(Coordinates { lng, lat })
}

fn parse_axis(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One point of interest returned by the list and keyword search queries.
pub struct TourItem {
    /// Unique identifier.
    pub content_id: ContentId,
    /// Display title.
    pub title: String,
    /// Primary address line.
    pub address: String,
    /// Optional secondary address line.
    pub address_detail: Option<String>,
    /// Region code.
    pub area_code: AreaCode,
    /// Content type code.
    pub content_type_id: ContentTypeId,
    /// Raw longitude string.
    pub map_x: Option<String>,
    /// Raw latitude string.
    pub map_y: Option<String>,
    /// Last modification timestamp (`YYYYMMDDhhmmss`).
    pub modified_time: Option<String>,
    /// Main image URL.
    pub first_image: Option<String>,
    /// Thumbnail image URL.
    pub first_image_thumb: Option<String>,
    /// Contact phone number.
    pub tel: Option<String>,
    /// Major, middle, and minor category codes.
    pub categories: [Option<String>; 3],
    /// Short description, present on some search results.
    pub overview: Option<String>,
}

impl TourItem {
    /// Create an item with only the required fields set.
    #[must_use]
    pub fn new(content_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content_id: ContentId(content_id.into()),
            title: title.into(),
            address: String::new(),
            address_detail: None,
            area_code: AreaCode(String::new()),
            content_type_id: ContentTypeId(String::new()),
            map_x: None,
            map_y: None,
            modified_time: None,
            first_image: None,
            first_image_thumb: None,
            tel: None,
            categories: [None, None, None],
            overview: None,
        }
    }

    /// Parsed coordinates, or `None` when either axis is unusable.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        parse_coordinates(self.map_x.as_deref(), self.map_y.as_deref())
    }

    /// Modification timestamp with absent values mapped to the earliest possible time.
    #[must_use]
    pub fn modified_time_key(&self) -> &str {
        self.modified_time
            .as_deref()
            .filter(|time| !time.is_empty())
            .unwrap_or(DEFAULT_MODIFIED_TIME)
    }

    /// Content type classification of this item.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type_id.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Ordering applied to the accumulated list.
pub enum SortOrder {
    /// Most recently modified first.
    #[default]
    Latest,
    /// Ascending by title under Korean collation.
    Name,
}

impl SortOrder {
    /// The other ordering.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Latest => SortOrder::Name,
            SortOrder::Name => SortOrder::Latest,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortOrder::Latest => "최신순",
            SortOrder::Name => "이름순",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Common detail record of a point of interest.
pub struct TourDetail {
    /// Unique identifier.
    pub content_id: ContentId,
    /// Content type code.
    pub content_type_id: ContentTypeId,
    /// Display title.
    pub title: String,
    /// Primary address line.
    pub address: Option<String>,
    /// Secondary address line.
    pub address_detail: Option<String>,
    /// Postal code.
    pub zipcode: Option<String>,
    /// Contact phone number.
    pub tel: Option<String>,
    /// Homepage markup as delivered by the API.
    pub homepage: Option<String>,
    /// Long description.
    pub overview: Option<String>,
    /// Main image URL.
    pub first_image: Option<String>,
    /// Thumbnail image URL.
    pub first_image_thumb: Option<String>,
    /// Raw longitude string.
    pub map_x: Option<String>,
    /// Raw latitude string.
    pub map_y: Option<String>,
    /// Creation timestamp.
    pub created_time: Option<String>,
    /// Last modification timestamp.
    pub modified_time: Option<String>,
}

impl TourDetail {
    /// Parsed coordinates, or `None` when either axis is unusable.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        parse_coordinates(self.map_x.as_deref(), self.map_y.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Operating information shared by every content type.
pub struct IntroCommon {
    /// Contact point.
    pub info_center: Option<String>,
    /// Closing days.
    pub rest_date: Option<String>,
    /// Opening hours.
    pub use_time: Option<String>,
    /// Parking availability.
    pub parking: Option<String>,
    /// Pet policy.
    pub pets: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Fields that only exist for a particular content type.
pub enum IntroDetails {
    /// Tourist attraction heritage designations.
    Attraction {
        /// World cultural heritage flag.
        heritage_culture: Option<String>,
        /// World natural heritage flag.
        heritage_nature: Option<String>,
        /// World documentary heritage flag.
        heritage_record: Option<String>,
    },
    /// Cultural facility pricing.
    Culture {
        /// Admission fee.
        use_fee: Option<String>,
        /// Discount information.
        discount_info: Option<String>,
    },
    /// Festival schedule.
    Festival {
        /// First day (`YYYYMMDD`).
        event_start: Option<String>,
        /// Last day (`YYYYMMDD`).
        event_end: Option<String>,
        /// Venue.
        event_place: Option<String>,
        /// Admission fee.
        use_fee: Option<String>,
    },
    /// Lodging rooms.
    Lodging {
        /// Number of rooms.
        room_count: Option<String>,
        /// Room types.
        room_type: Option<String>,
    },
    /// Restaurant menu.
    Restaurant {
        /// Signature dishes.
        treat_menu: Option<String>,
    },
    /// Any other content type, keeping the remaining non-empty fields by name.
    Other(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Operating information, split into a shared base and type-specific details.
pub struct TourIntro {
    /// Unique identifier.
    pub content_id: ContentId,
    /// Content type code the details are keyed by.
    pub content_type_id: ContentTypeId,
    /// Shared fields.
    pub common: IntroCommon,
    /// Type-specific fields.
    pub details: IntroDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Gallery image of a point of interest.
pub struct TourImage {
    /// Owning item.
    pub content_id: ContentId,
    /// Image caption.
    pub name: Option<String>,
    /// Full-size URL.
    pub origin_url: Option<String>,
    /// Thumbnail URL.
    pub small_url: Option<String>,
    /// Position within the gallery.
    pub serial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Pet companion travel information.
pub struct PetTourInfo {
    /// Owning item.
    pub content_id: ContentId,
    /// Leash requirement.
    pub leash: Option<String>,
    /// Accepted pet sizes.
    pub size: Option<String>,
    /// Places pets may enter.
    pub places: Option<String>,
    /// Extra fee.
    pub fee: Option<String>,
    /// Other notes.
    pub info: Option<String>,
    /// Parking information.
    pub parking: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Area code entry returned by the area lookup.
pub struct AreaInfo {
    /// Area or district code.
    pub code: AreaCode,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Saved reference to a point of interest.
pub struct Bookmark {
    /// Bookmarked item.
    pub content_id: ContentId,
    /// When the bookmark was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_coordinates() {
        let coords = parse_coordinates(Some("129.042345"), Some("35.1795543"));
        let coords = coords.expect("coordinates should parse");
        assert!((coords.lng - 129.042_345).abs() < 1e-9, "lng mismatch");
        assert!((coords.lat - 35.179_554_3).abs() < 1e-9, "lat mismatch");
    }

    #[test]
    fn parses_integer_like_coordinates() {
        let coords = parse_coordinates(Some("126"), Some(" 37 ")).expect("coordinates should parse");
        assert_eq!(coords, Coordinates { lng: 126.0, lat: 37.0 });
    }

    #[test]
    fn missing_coordinates_yield_none() {
        assert_eq!(parse_coordinates(None, Some("35.179")), None);
        assert_eq!(parse_coordinates(Some("129.04"), None), None);
        assert_eq!(parse_coordinates(Some(""), Some("35.179")), None);
    }

    #[test]
    fn non_numeric_coordinates_yield_none() {
        assert_eq!(parse_coordinates(Some("abc"), Some("35.179")), None);
        assert_eq!(parse_coordinates(Some("129.04"), Some("NaN")), None);
        assert_eq!(parse_coordinates(Some("inf"), Some("35.179")), None);
    }

    #[test]
    fn item_without_modified_time_uses_default_key() {
        let mut item = TourItem::new("1", "서울숲");
        assert_eq!(item.modified_time_key(), DEFAULT_MODIFIED_TIME);
        item.modified_time = Some(String::new());
        assert_eq!(item.modified_time_key(), DEFAULT_MODIFIED_TIME);
        item.modified_time = Some("20241101093000".to_owned());
        assert_eq!(item.modified_time_key(), "20241101093000");
    }

    #[test]
    fn content_type_codes_round_trip_through_labels() {
        assert_eq!(ContentType::from_code("39"), ContentType::Restaurant);
        assert_eq!(ContentType::Restaurant.label(), "음식점");
        assert_eq!(
            ContentType::from_code("99"),
            ContentType::Other("99".to_owned())
        );
        assert_eq!(ContentTypeId::from(ContentType::Lodging).as_str(), "32");
    }

    #[test]
    fn area_labels_resolve_known_codes() {
        assert_eq!(AreaCode::from("39").label(), Some("제주"));
        assert_eq!(AreaCode::from("99").label(), None);
    }
}
