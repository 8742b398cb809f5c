//! Recommendation contract and backend client
//!
//! The backend answers a prompt with a food suggestion. Its payload is treated
//! as untrusted: every field defaults when absent and only an `error` field is
//! interpreted.

pub mod client;

use serde::{Deserialize, Serialize};

/// A restaurant suggested alongside the food
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restaurant {
    pub name: String,
    pub address: String,
}

/// Food recommendation returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Recommendation {
    pub food_name: String,
    pub reason: String,
    pub average_price: f64,
    pub calories: f64,
    pub restaurants: Vec<Restaurant>,
}

/// Request body sent to the recommendation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub prompt: String,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.food_name)?;
        if !self.reason.is_empty() {
            writeln!(f, "  {}", self.reason)?;
        }
        writeln!(f, "  Average price: {} KRW", self.average_price)?;
        writeln!(f, "  Calories: {} kcal", self.calories)?;
        if !self.restaurants.is_empty() {
            writeln!(f, "  Restaurants:")?;
            for (i, r) in self.restaurants.iter().enumerate() {
                writeln!(f, "    {}. {} ({})", i + 1, r.name, r.address)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_deserialization() {
        let rec: Recommendation = serde_json::from_str(r#"{"foodName": "Kimchi stew"}"#).unwrap();
        assert_eq!(rec.food_name, "Kimchi stew");
        assert_eq!(rec.calories, 0.0);
        assert!(rec.restaurants.is_empty());
    }

    #[test]
    fn test_full_payload() {
        let json = r#"{
            "foodName": "Pajeon",
            "reason": "Rainy days call for pancakes",
            "averagePrice": 15000,
            "calories": 650,
            "restaurants": [
                {"name": "Jeon House", "address": "Jongno-gu"},
                {"name": "Rainy Pub"}
            ]
        }"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.average_price, 15000.0);
        assert_eq!(rec.restaurants.len(), 2);
        assert_eq!(rec.restaurants[1].address, "");
    }

    #[test]
    fn test_display() {
        let rec = Recommendation {
            food_name: "Bibimbap".to_string(),
            reason: String::new(),
            average_price: 9000.0,
            calories: 550.0,
            restaurants: vec![Restaurant {
                name: "Gogung".to_string(),
                address: "Myeongdong".to_string(),
            }],
        };
        let text = rec.to_string();
        assert!(text.starts_with("Bibimbap\n"));
        assert!(text.contains("1. Gogung (Myeongdong)"));
    }
}
