//! Canned-reply chat over the assistant's public operations.

use rand::Rng;
use regex::Regex;

use crate::assistant::{OutfitReply, WeatherAssistant, NO_LOCATION_ADVISORY};
use nimbus_alerts::EnableOutcome;
use nimbus_outfit::advice;
use nimbus_weather::WeatherCondition;

/// Source of reply-pool indices. `len` is always at least 1.
pub trait RandomSource: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG, the production source.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic source for tests and scripted demos.
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn pick(&self, len: usize) -> usize {
        self.0 % len.max(1)
    }
}

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Outfit,
    WeatherSummary,
    Temperature,
    Rain,
    Humidity,
    Wind,
    Planning,
    Greeting,
    Thanks,
    Capability,
    AlertsEnable,
    AlertsDisable,
    AlertsStatus,
    Fallback,
}

const GREETINGS: [&str; 3] = [
    "Hello! Ask me about the weather or what to wear today.",
    "Hi there! I can talk forecasts, outfits and alerts.",
    "Hey! Want a weather summary or an outfit suggestion?",
];

const THANKS_REPLIES: [&str; 3] = [
    "Anytime!",
    "Happy to help. Stay weather-ready!",
    "You're welcome!",
];

const FALLBACKS: [&str; 3] = [
    "I didn't catch that. Try asking about the weather or what to wear.",
    "Not sure I follow. Ask me about rain, temperature or outfits.",
    "That one's beyond me. Weather and outfits are my thing.",
];

const CAPABILITY_REPLY: &str = "I can summarize the current weather, suggest an outfit for \
the conditions, answer rain, wind and humidity questions, and manage weather alerts. \
Try 'what should I wear today?'";

const NO_CITY_REPLY: &str =
    "I don't have a city loaded yet. Run a forecast first, then ask me again.";

/// Regex-based intent matching plus reply selection.
///
/// Patterns are checked in order; alert commands and concrete topics win
/// over greetings so "hi, will it rain?" answers the rain question.
pub struct ChatEngine {
    matchers: Vec<(Regex, Intent)>,
    random: Box<dyn RandomSource>,
}

impl ChatEngine {
    pub fn new(random: Box<dyn RandomSource>) -> Result<Self, regex::Error> {
        let patterns: [(&str, Intent); 13] = [
            (r"(?i)\b(enable|turn on)\b.*\balerts?\b", Intent::AlertsEnable),
            (r"(?i)\b(disable|turn off|stop)\b.*\balerts?\b", Intent::AlertsDisable),
            (r"(?i)\balerts?\b", Intent::AlertsStatus),
            (r"(?i)\b(outfit|wear|dress|clothes|clothing)\b", Intent::Outfit),
            (r"(?i)\b(rain|raining|rainy|umbrella|drizzle)\b", Intent::Rain),
            (r"(?i)\b(temperature|degrees|hot|cold|warm)\b", Intent::Temperature),
            (r"(?i)\b(humid|humidity|muggy|sticky)\b", Intent::Humidity),
            (r"(?i)\bwind", Intent::Wind),
            (
                r"(?i)\b(plan|plans|planning|trip|travel|picnic|outdoor|outdoors|event)\b",
                Intent::Planning,
            ),
            (r"(?i)\b(weather|forecast|conditions|outside)\b", Intent::WeatherSummary),
            (
                r"(?i)^\s*(hi|hello|hey|good\s+(morning|afternoon|evening))\b",
                Intent::Greeting,
            ),
            (r"(?i)\b(thanks|thank\s+you|thx)\b", Intent::Thanks),
            (r"(?i)\b(help|what can you do|who are you)\b", Intent::Capability),
        ];

        let matchers = patterns
            .iter()
            .map(|(pattern, intent)| Regex::new(pattern).map(|regex| (regex, *intent)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers, random })
    }

    pub fn classify(&self, text: &str) -> Intent {
        for (regex, intent) in &self.matchers {
            if regex.is_match(text) {
                return *intent;
            }
        }
        Intent::Fallback
    }

    /// Answer one message. State flows only through the assistant's public
    /// operations.
    pub async fn respond(&self, assistant: &WeatherAssistant, text: &str) -> String {
        let intent = self.classify(text);
        tracing::debug!("Chat intent {:?} for {:?}", intent, text);

        match intent {
            Intent::Greeting => self.pick(&GREETINGS).to_string(),
            Intent::Thanks => self.pick(&THANKS_REPLIES).to_string(),
            Intent::Capability => CAPABILITY_REPLY.to_string(),
            Intent::Fallback => self.pick(&FALLBACKS).to_string(),
            Intent::AlertsEnable => match assistant.dispatcher().request_enable().await {
                EnableOutcome::EnabledInApp => {
                    "Alerts enabled. They'll show up here in-app.".to_string()
                }
                EnableOutcome::EnabledNative => {
                    "Alerts enabled with system notifications.".to_string()
                }
                EnableOutcome::Blocked => {
                    "Notifications are blocked at the platform level. Allow them in system settings first."
                        .to_string()
                }
                EnableOutcome::Declined => "No problem, alerts stay off.".to_string(),
            },
            Intent::AlertsDisable => {
                assistant.dispatcher().disable();
                "Weather alerts are off.".to_string()
            }
            Intent::AlertsStatus => {
                if assistant.settings().enabled() {
                    "Alerts are on. I'll flag rain, heat, cold and storms for your city."
                        .to_string()
                } else {
                    "Alerts are off. Say 'enable alerts' to turn them on.".to_string()
                }
            }
            Intent::Outfit => self.outfit_reply(assistant),
            other => self.weather_reply(assistant, other),
        }
    }

    fn outfit_reply(&self, assistant: &WeatherAssistant) -> String {
        let Some(snapshot) = assistant.snapshot() else {
            return NO_LOCATION_ADVISORY.to_string();
        };
        let OutfitReply::Recommendation { presentation, .. } = assistant.request_outfit() else {
            return NO_LOCATION_ADVISORY.to_string();
        };
        format!(
            "{}\nSuggested: {}.\n{}",
            presentation.summary,
            presentation.items.join(", "),
            advice(snapshot.temperature_c, snapshot.humidity_percent)
        )
    }

    fn weather_reply(&self, assistant: &WeatherAssistant, intent: Intent) -> String {
        let Some(snapshot) = assistant.snapshot() else {
            return NO_CITY_REPLY.to_string();
        };
        let label = snapshot.label();

        match intent {
            Intent::WeatherSummary => format!(
                "{} in {} right now: {:.0}°C (feels like {:.0}°C), humidity {:.0}%, wind {:.0} km/h.",
                snapshot.condition().description(),
                label,
                snapshot.temperature_c,
                snapshot.feels_like_c,
                snapshot.humidity_percent,
                snapshot.wind_speed_kmh
            ),
            Intent::Temperature => format!(
                "It's {:.0}°C in {}, feels like {:.0}°C.",
                snapshot.temperature_c, label, snapshot.feels_like_c
            ),
            Intent::Rain => {
                let wet = matches!(
                    snapshot.condition(),
                    WeatherCondition::Drizzle
                        | WeatherCondition::Rain
                        | WeatherCondition::HeavyRain
                        | WeatherCondition::Thunderstorm
                );
                if wet {
                    format!(
                        "Yes, it's wet in {}: {} at the moment. Take an umbrella.",
                        label,
                        snapshot.condition().description()
                    )
                } else {
                    format!("No rain falling in {} right now.", label)
                }
            }
            Intent::Humidity => {
                let humidity = snapshot.humidity_percent;
                let feel = if humidity > 70.0 {
                    "It will feel sticky out there."
                } else if humidity < 30.0 {
                    "Quite dry today."
                } else {
                    "Comfortable enough."
                };
                format!("Humidity in {} is {:.0}%. {}", label, humidity, feel)
            }
            Intent::Wind => {
                let wind = snapshot.wind_speed_kmh;
                let feel = if wind > 20.0 {
                    "Hold onto your hat."
                } else if wind > 10.0 {
                    "A noticeable breeze."
                } else {
                    "Calm out there."
                };
                format!("Wind in {} is {:.0} km/h. {}", label, wind, feel)
            }
            Intent::Planning => format!(
                "Right now in {}: {}, {:.0}°C. {}",
                label,
                snapshot.condition().description(),
                snapshot.temperature_c,
                advice(snapshot.temperature_c, snapshot.humidity_percent)
            ),
            _ => self.pick(&FALLBACKS).to_string(),
        }
    }

    fn pick<'a>(&self, pool: &[&'a str]) -> &'a str {
        pool[self.random.pick(pool.len())]
    }
}
