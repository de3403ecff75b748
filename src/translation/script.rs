use zhconv::{zhconv, Variant};

/// Traditional script regions a target language can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraditionalVariant {
    Taiwan,
    HongKong,
    Macau,
}

impl TraditionalVariant {
    fn zhconv_variant(self) -> Variant {
        match self {
            Self::Taiwan => Variant::ZhTW,
            Self::HongKong => Variant::ZhHK,
            Self::Macau => Variant::ZhMO,
        }
    }
}

/// Simplified-to-traditional conversion for Chinese targets.
///
/// Models often answer in simplified script even when asked for traditional,
/// so every translated line is passed through this when the target calls for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptNormalizer {
    variant: TraditionalVariant,
}

impl ScriptNormalizer {
    /// Normalizer for `target_language`, or `None` when no conversion applies
    pub fn for_target(target_language: &str) -> Option<Self> {
        let target = target_language.trim().to_lowercase();

        let variant = if target == "zh-hk" || target.contains("hong kong") {
            TraditionalVariant::HongKong
        } else if target == "zh-mo" || target.contains("macau") || target.contains("macao") {
            TraditionalVariant::Macau
        } else if target.contains("traditional chinese") || target == "zh-hant" || target == "zh-tw" {
            // Taiwan standard with phrase conversion
            TraditionalVariant::Taiwan
        } else {
            return None;
        };

        Some(Self { variant })
    }

    pub fn variant(&self) -> TraditionalVariant {
        self.variant
    }

    pub fn normalize(&self, text: &str) -> String {
        zhconv(text, self.variant.zhconv_variant())
    }
}
