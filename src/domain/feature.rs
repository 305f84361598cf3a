use super::request::PaymentRequest;
use chrono::Utc;
use serde::Serialize;

/// A paid feature that a successful payment unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PremiumFeature {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Price in whole stablecoin units.
    pub price: &'static str,
}

pub const PREMIUM_FEATURES: [PremiumFeature; 4] = [
    PremiumFeature {
        id: "ai_insights",
        name: "AI Health Insights",
        description: "Get personalized health insights powered by AI",
        price: "2.99",
    },
    PremiumFeature {
        id: "advanced_analytics",
        name: "Advanced Analytics",
        description: "Detailed health trends and predictive analytics",
        price: "4.99",
    },
    PremiumFeature {
        id: "telemedicine",
        name: "Telemedicine Integration",
        description: "Connect with healthcare providers directly",
        price: "9.99",
    },
    PremiumFeature {
        id: "premium_storage",
        name: "Premium Storage",
        description: "Unlimited health record storage",
        price: "1.99",
    },
];

impl PremiumFeature {
    pub fn all() -> &'static [PremiumFeature] {
        &PREMIUM_FEATURES
    }

    pub fn lookup(id: &str) -> Option<&'static PremiumFeature> {
        PREMIUM_FEATURES.iter().find(|feature| feature.id == id)
    }

    /// Builds the request that pays for this feature.
    pub fn payment_request(&self, recipient: &str, user_id: &str) -> PaymentRequest {
        PaymentRequest::new(
            self.price,
            recipient,
            format!("HealthSync Premium: {}", self.name),
        )
        .with_metadata("featureId", self.id)
        .with_metadata("userId", user_id)
        .with_metadata("timestamp", Utc::now().timestamp_millis())
    }
}
