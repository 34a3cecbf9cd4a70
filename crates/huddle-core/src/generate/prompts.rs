//! Prompt construction for plan and promotion requests.
//!
//! The planner catalogue (titles and suggested categories) is defined in
//! `planners.toml` and embedded in the binary at compile time.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::GenerateError;

/// Who the generated content is for. Interpolated into every prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    /// Organization name, e.g. `"YouthConnect"`.
    pub organization: String,
    /// Where the group meets, e.g. `"Jamaica"`.
    pub region: String,
}

impl Default for Audience {
    fn default() -> Self {
        Self {
            organization: "YouthConnect".to_owned(),
            region: "Jamaica".to_owned(),
        }
    }
}

impl Audience {
    /// System instruction for structured plan generation.
    pub fn plan_system_instruction(&self) -> String {
        let Self {
            organization,
            region,
        } = self;
        format!(
            "You are an expert Youth Ministry Consultant for \"{organization}\", designed for a small \
             Christian youth department (5-8 exec members) in {region}.\n\
             Your goal is to help them plan, grow, and execute events.\n\
             \n\
             CRITICAL CONTEXT:\n\
             1. LOCAL CONTEXT: Recommendations must be realistic for youth in {region}. Use local \
             terminology where appropriate. Avoid ideas that assume a different culture or climate \
             (e.g. prom, snow, thanksgiving, expensive camps).\n\
             2. SMALL TEAM: The team is small. Suggestions must be manageable for 5-8 leaders.\n\
             3. BUDGET CONSCIOUS: Prioritize low/no-cost ideas.\n\
             4. SPIRITUALLY DEEP: Activities should be fun but always have a spiritual anchor.\n\
             5. ENGAGING: Focus on getting youth OFF phones or using phones for engagement, not \
             distraction.\n\
             \n\
             Output MUST be valid JSON adhering to the schema provided.\n"
        )
    }

    /// System instruction for free-form promotional text.
    pub fn text_system_instruction(&self) -> String {
        let Self {
            organization,
            region,
        } = self;
        format!(
            "You are an expert Youth Ministry Consultant for \"{organization}\" in {region}.\n\
             Provide creative, engaging, and culturally relevant content for youth ministry \
             promotion.\n\
             Keep the tone appropriate for Christian youth (Gen Z).\n"
        )
    }
}

/// Appended to every plan prompt so the response can be parsed.
pub const RESPONSE_SCHEMA: &str = r#"Respond with JSON only, no commentary, in exactly this shape:
{
  "items": [
    {
      "title": "string",
      "description": "string",
      "materialsNeeded": ["physical items or digital tools needed"],
      "steps": ["actionable steps from planning to execution"],
      "scriptureReference": "relevant Bible verse(s)",
      "suggestedDuration": "e.g. '30 mins', '2 hours'",
      "difficultyLevel": "Low | Medium | High",
      "estimatedCost": "Free | Low | Medium | High",
      "roles": ["optional: suggested roles for the executive team"],
      "assignedTeamMembers": ["optional: names of team members, if given in the context"]
    }
  ]
}
Required fields: title, description, materialsNeeded, steps, scriptureReference,
suggestedDuration, difficultyLevel, estimatedCost."#;

// ---------------------------------------------------------------------------
// Planner catalogue
// ---------------------------------------------------------------------------

/// The ways of asking for plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Planner {
    /// Structured event plans, optionally over a monthly or quarterly horizon.
    Event,
    Ideas,
    Spiritual,
    /// Turns a free-text goal into steps, roles and a timeline.
    Execution,
    Community,
}

impl Planner {
    pub const ALL: [Planner; 5] = [
        Planner::Event,
        Planner::Ideas,
        Planner::Spiritual,
        Planner::Execution,
        Planner::Community,
    ];

    /// Catalogue key, as used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Self::Event => "planner",
            Self::Ideas => "ideas",
            Self::Spiritual => "spiritual",
            Self::Execution => "execution",
            Self::Community => "community",
        }
    }
}

impl fmt::Display for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Planner {
    type Err = PlannerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planner" | "event" => Ok(Self::Event),
            "ideas" => Ok(Self::Ideas),
            "spiritual" => Ok(Self::Spiritual),
            "execution" => Ok(Self::Execution),
            "community" => Ok(Self::Community),
            _ => Err(PlannerParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Planner`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid planner: {0:?} (expected planner, ideas, spiritual, execution, or community)")]
pub struct PlannerParseError(pub String);

/// One entry of the embedded planner catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerInfo {
    pub name: String,
    pub title: String,
    pub summary: String,
    /// Whether the planner accepts a [`Horizon`] other than `Single`.
    pub horizons: bool,
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlannerCatalogue {
    planners: Vec<PlannerInfo>,
}

static PLANNERS_TOML: &str = include_str!("planners.toml");

/// Load the embedded planner catalogue.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. The file is compiled in, so a
/// unit test covers it.
pub fn load_planners() -> Vec<PlannerInfo> {
    let catalogue: PlannerCatalogue =
        toml::from_str(PLANNERS_TOML).expect("embedded planners.toml is invalid");
    catalogue.planners
}

/// Catalogue entry for `planner`.
pub fn planner_info(planner: Planner) -> Option<PlannerInfo> {
    load_planners()
        .into_iter()
        .find(|p| p.name == planner.key())
}

/// Category used when none is given: the planner's first suggestion.
pub fn default_category(planner: Planner) -> String {
    planner_info(planner)
        .and_then(|p| p.categories.into_iter().next())
        .unwrap_or_else(|| "General".to_owned())
}

// ---------------------------------------------------------------------------
// Plan requests
// ---------------------------------------------------------------------------

/// How far ahead an event plan reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Horizon {
    #[default]
    Single,
    /// Four weekly items titled `Week 1`, `Week 2`, ...
    Monthly,
    /// Three monthly items titled `Month 1`, `Month 2`, ...
    Quarterly,
}

impl Horizon {
    /// Label for the `index`-th result (0-based) in a multi-item plan.
    pub fn item_label(self, index: usize) -> Option<String> {
        match self {
            Self::Single => None,
            Self::Monthly => Some(format!("Week {}", index + 1)),
            Self::Quarterly => Some(format!("Month {}", index + 1)),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Single => "single",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        };
        f.write_str(s)
    }
}

impl FromStr for Horizon {
    type Err = HorizonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            _ => Err(HorizonParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Horizon`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid horizon: {0:?} (expected single, monthly, or quarterly)")]
pub struct HorizonParseError(pub String);

/// A request for structured plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub planner: Planner,
    pub category: String,
    /// Free-text details from the user; may be empty except for
    /// [`Planner::Execution`].
    pub details: String,
    /// Only honoured by [`Planner::Event`].
    pub horizon: Horizon,
}

impl PlanRequest {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            category: default_category(planner),
            details: String::new(),
            horizon: Horizon::Single,
        }
    }

    /// The effective horizon: every planner but the event planner is single.
    pub fn horizon(&self) -> Horizon {
        match self.planner {
            Planner::Event => self.horizon,
            _ => Horizon::Single,
        }
    }

    /// Title of the context this request works from, used for media
    /// categories later on.
    pub fn context_title(&self) -> &str {
        match self.planner {
            Planner::Execution => self.details.trim(),
            _ => self.category.trim(),
        }
    }

    /// Build the user prompt, schema block included.
    pub fn prompt(&self, audience: &Audience) -> Result<String, GenerateError> {
        let category = self.category.trim();
        let details = self.details.trim();
        let region = &audience.region;

        let body = match self.planner {
            Planner::Event => {
                let details = if details.is_empty() {
                    "General activities"
                } else {
                    details
                };
                let base = format!("Context: {details}.");
                match self.horizon {
                    Horizon::Single => format!("Generate a single plan for {category}. {base}"),
                    Horizon::Monthly => format!(
                        "Generate a 4-week schedule for {category}. {base} \
                         Return 4 items titled 'Week 1...', etc."
                    ),
                    Horizon::Quarterly => format!(
                        "Generate a 3-month plan for {category}. {base} \
                         Return 3 items titled 'Month 1...', etc."
                    ),
                }
            }
            Planner::Ideas => {
                let preference = if details.is_empty() { "Any" } else { details };
                format!(
                    "Generate 3 ideas for: {category}. Context: youth ministry in {region}. \
                     Preference: {preference}."
                )
            }
            Planner::Spiritual => {
                format!("3 spiritual ideas for: \"{category}\". Relatable for teens in {region}.")
            }
            Planner::Execution => {
                if details.is_empty() {
                    return Err(GenerateError::MissingContext);
                }
                format!("Execution plan for: \"{details}\". Steps, roles, timeline.")
            }
            Planner::Community => format!("3 community building ideas for: {category}."),
        };

        Ok(format!("{body}\n\n{RESPONSE_SCHEMA}"))
    }
}

// ---------------------------------------------------------------------------
// Promotion requests
// ---------------------------------------------------------------------------

/// Kinds of promotional text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionKind {
    Poster,
    Script,
    Caption,
    WhatsApp,
}

impl PromotionKind {
    pub fn media_kind(self) -> huddle_db::models::MediaKind {
        use huddle_db::models::MediaKind;
        match self {
            Self::Poster => MediaKind::Poster,
            Self::Script => MediaKind::Script,
            Self::Caption => MediaKind::Caption,
            Self::WhatsApp => MediaKind::WhatsApp,
        }
    }
}

impl fmt::Display for PromotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_kind().as_str())
    }
}

impl FromStr for PromotionKind {
    type Err = PromotionKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poster" => Ok(Self::Poster),
            "script" => Ok(Self::Script),
            "caption" => Ok(Self::Caption),
            "whatsapp" => Ok(Self::WhatsApp),
            _ => Err(PromotionKindParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PromotionKind`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid promotion kind: {0:?} (expected poster, script, caption, or whatsapp)")]
pub struct PromotionKindParseError(pub String);

/// A request for promotional text about an event or topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRequest {
    pub kind: PromotionKind,
    /// The event or topic being promoted.
    pub context: String,
    pub tone: String,
    /// Target platform for scripts.
    pub platform: String,
    /// Message type for WhatsApp broadcasts.
    pub message_type: String,
}

impl PromotionRequest {
    pub const DEFAULT_TONE: &str = "Fun & Youthful";
    pub const DEFAULT_PLATFORM: &str = "Instagram";
    pub const DEFAULT_MESSAGE_TYPE: &str = "Event Invite";

    pub fn new(kind: PromotionKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
            tone: Self::DEFAULT_TONE.to_owned(),
            platform: Self::DEFAULT_PLATFORM.to_owned(),
            message_type: Self::DEFAULT_MESSAGE_TYPE.to_owned(),
        }
    }

    pub fn prompt(&self, audience: &Audience) -> Result<String, GenerateError> {
        let context = self.context.trim();
        if context.is_empty() {
            return Err(GenerateError::MissingContext);
        }
        let Self {
            tone,
            platform,
            message_type,
            ..
        } = self;
        let region = &audience.region;

        let base = format!(
            "Context: A Christian youth event in {region} called \"{context}\". \
             Target audience: Gen Z (13-25). Tone: {tone}."
        );

        let body = match self.kind {
            PromotionKind::Poster => format!(
                "Generate a detailed design strategy for a poster/flyer.\n\
                 Include: 1. Visual Theme/Metaphor 2. Color Palette (hex codes if possible) \
                 3. Headline Suggestion 4. Font Style Recommendations 5. Key Iconography.\n\
                 Make it trendy and culturally relevant to {region}. Format clearly."
            ),
            PromotionKind::Script => format!(
                "Write a short, high-energy video script for {platform} (Reels/TikTok).\n\
                 Include: 1. A Scroll-Stopping Hook 2. Visual/Audio cues 3. The Core Message \
                 4. A Clear CTA.\n\
                 Use clean local slang if appropriate. Keep it under 30 seconds."
            ),
            PromotionKind::Caption => format!(
                "Generate 3 caption options for social media:\n\
                 1. Short & Punchy\n\
                 2. Story/Testimonial style\n\
                 3. Engaging Question style\n\
                 Include relevant hashtags for Christian youth in {region}."
            ),
            PromotionKind::WhatsApp => format!(
                "Write a {message_type} for a WhatsApp Broadcast List.\n\
                 \n\
                 Requirements:\n\
                 - Format specifically for WhatsApp (use *bold* for emphasis, _italics_, and emojis).\n\
                 - Keep it scannable and mobile-friendly.\n\
                 - Tone: {tone}.\n\
                 - Structure: Attention-grabbing header, Key details (Date/Time/Location), and a \
                 clear Call to Action.\n\
                 - Do not use placeholders like \"Hi [Name]\" as this is for a broadcast list.\n\
                 \n\
                 Provide 2 slight variations of the message."
            ),
        };

        Ok(format!("{base}\n{body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalogue_covers_every_planner() {
        for planner in Planner::ALL {
            let info = planner_info(planner).unwrap_or_else(|| panic!("missing {planner}"));
            assert!(!info.title.is_empty());
        }
        assert!(planner_info(Planner::Event).unwrap().horizons);
        assert!(!planner_info(Planner::Ideas).unwrap().horizons);
    }

    #[test]
    fn default_category_is_first_suggestion() {
        assert_eq!(default_category(Planner::Event), "General Meeting");
        assert_eq!(default_category(Planner::Execution), "General");
    }

    #[test]
    fn monthly_event_prompt_asks_for_four_weeks() {
        let mut req = PlanRequest::new(Planner::Event);
        req.category = "Bible Study".into();
        req.horizon = Horizon::Monthly;
        let prompt = req.prompt(&Audience::default()).unwrap();
        assert!(prompt.starts_with(
            "Generate a 4-week schedule for Bible Study. Context: General activities."
        ));
        assert!(prompt.contains("'Week 1...'"));
        assert!(prompt.contains("\"items\""));
    }

    #[test]
    fn quarterly_event_prompt_asks_for_three_months() {
        let mut req = PlanRequest::new(Planner::Event);
        req.horizon = Horizon::Quarterly;
        req.details = "Easter season".into();
        let prompt = req.prompt(&Audience::default()).unwrap();
        assert!(prompt.contains("3-month plan for General Meeting. Context: Easter season."));
    }

    #[test]
    fn horizon_is_ignored_outside_event_planner() {
        let mut req = PlanRequest::new(Planner::Ideas);
        req.horizon = Horizon::Quarterly;
        assert_eq!(req.horizon(), Horizon::Single);
        let prompt = req.prompt(&Audience::default()).unwrap();
        assert!(prompt.starts_with("Generate 3 ideas for: General."));
        assert!(prompt.contains("Preference: Any."));
    }

    #[test]
    fn execution_needs_details() {
        let req = PlanRequest::new(Planner::Execution);
        assert!(matches!(
            req.prompt(&Audience::default()),
            Err(GenerateError::MissingContext)
        ));
    }

    #[test]
    fn horizon_labels() {
        assert_eq!(Horizon::Single.item_label(0), None);
        assert_eq!(Horizon::Monthly.item_label(2).as_deref(), Some("Week 3"));
        assert_eq!(Horizon::Quarterly.item_label(0).as_deref(), Some("Month 1"));
    }

    #[test]
    fn promotion_prompt_interpolates_request() {
        let mut req = PromotionRequest::new(PromotionKind::WhatsApp, "Youth Rally");
        req.message_type = "Reminder".into();
        let prompt = req.prompt(&Audience::default()).unwrap();
        assert!(prompt.contains("called \"Youth Rally\""));
        assert!(prompt.contains("Write a Reminder for a WhatsApp Broadcast List."));
        assert!(prompt.contains("Tone: Fun & Youthful."));
    }

    #[test]
    fn promotion_without_context_is_rejected() {
        let req = PromotionRequest::new(PromotionKind::Poster, "   ");
        assert!(matches!(
            req.prompt(&Audience::default()),
            Err(GenerateError::MissingContext)
        ));
    }

    #[test]
    fn audience_is_interpolated_into_system_instructions() {
        let audience = Audience {
            organization: "Riverside Youth".into(),
            region: "Kingston".into(),
        };
        assert!(audience.plan_system_instruction().contains("\"Riverside Youth\""));
        assert!(audience.plan_system_instruction().contains("youth in Kingston"));
        assert!(audience.text_system_instruction().contains("in Kingston"));
    }

    #[test]
    fn parse_names() {
        assert_eq!("Planner".parse::<Planner>().unwrap(), Planner::Event);
        assert_eq!("quarterly".parse::<Horizon>().unwrap(), Horizon::Quarterly);
        assert_eq!("WhatsApp".parse::<PromotionKind>().unwrap(), PromotionKind::WhatsApp);
        assert!("tweet".parse::<PromotionKind>().is_err());
    }
}
