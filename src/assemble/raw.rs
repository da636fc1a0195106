//! Raw observation and metadata documents as delivered by the data provider

use serde::{Deserialize, Serialize};

/// One series of observations for a single coordinate of a cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVector {
    pub product_id: i64,
    /// Dot separated member ids, one per cube dimension
    pub coordinate: String,
    pub vector_id: i64,
    #[serde(default)]
    pub vector_data_point: Vec<RawDataPoint>,
}

/// One observation of a vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataPoint {
    pub ref_per: String,
    pub value: Option<f64>,
    /// Power of ten the value is expressed in
    #[serde(default)]
    pub scalar_factor_code: i32,
}

/// Cube metadata: title and dimension member names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeMetadata {
    pub product_id: i64,
    pub cube_title_en: String,
    #[serde(default)]
    pub dimension: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub dimension_name_en: String,
    #[serde(default)]
    pub member: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub member_id: i64,
    pub member_name_en: String,
}

/// Description of a scalar factor code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarCode {
    pub scalar_factor_code: i32,
    pub scalar_factor_desc_en: String,
}

impl CubeMetadata {
    /// Name of the dimension at `position` and of its member `member_id`
    pub fn member_name(&self, position: usize, member_id: i64) -> Option<(&str, &str)> {
        let dimension = self.dimension.get(position)?;
        let member = dimension.member.iter().find(|m| m.member_id == member_id)?;
        Some((&dimension.dimension_name_en, &member.member_name_en))
    }
}
