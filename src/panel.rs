use crate::constants::{DIAL_MAX, DIAL_MIN, DIAL_PREF_KEY_PREFIX, ENHANCED_PREF_KEY};
use crate::errors::AppError;
use crate::preferences::PreferenceStore;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DialName {
    Playfulness,
    Humor,
    Emotion,
    Poetic,
    Metaphorical,
    Technical,
}

impl DialName {
    pub const ALL: [DialName; 6] = [
        DialName::Playfulness,
        DialName::Humor,
        DialName::Emotion,
        DialName::Poetic,
        DialName::Metaphorical,
        DialName::Technical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DialName::Playfulness => "playfulness",
            DialName::Humor => "humor",
            DialName::Emotion => "emotion",
            DialName::Poetic => "poetic",
            DialName::Metaphorical => "metaphorical",
            DialName::Technical => "technical",
        }
    }

    /// Built-in value used until the user moves the dial.
    pub fn default_value(self) -> u8 {
        match self {
            DialName::Playfulness => 7,
            DialName::Humor => 4,
            DialName::Emotion => 6,
            DialName::Poetic => 8,
            DialName::Metaphorical => 8,
            DialName::Technical => 3,
        }
    }

    pub fn persisted_key(self) -> String {
        format!("{}{}", DIAL_PREF_KEY_PREFIX, self.as_str())
    }
}

impl fmt::Display for DialName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DialName::ALL
            .into_iter()
            .find(|dial| dial.as_str() == wanted)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Unknown dial '{}'. Known dials: {}",
                    s.trim(),
                    DialName::ALL.map(DialName::as_str).join(", ")
                ))
            })
    }
}

pub type TuningValues = BTreeMap<DialName, u8>;

/// One bounded style control plus the numeric label shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningDial {
    name: DialName,
    value: u8,
    label: String,
}

impl TuningDial {
    fn new(name: DialName) -> Self {
        let value = name.default_value();
        Self {
            name,
            value,
            label: value.to_string(),
        }
    }

    pub fn name(&self) -> DialName {
        self.name
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn persisted_key(&self) -> String {
        self.name.persisted_key()
    }

    fn set_value(&mut self, raw: i64) -> u8 {
        self.value = raw.clamp(DIAL_MIN as i64, DIAL_MAX as i64) as u8;
        self.label = self.value.to_string();
        self.value
    }
}

/// Values read off the panel controls at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub use_enhanced: bool,
    pub tuning: TuningValues,
}

/// Enhanced-mode toggle and tuning dials, mirrored into the preference store.
///
/// The panel is the only writer of the keys it owns. Every input event is
/// persisted before the handler returns.
#[derive(Debug)]
pub struct ParameterPanel {
    store: PreferenceStore,
    enhanced: bool,
    tuning_section_visible: bool,
    dials: Vec<TuningDial>,
}

impl ParameterPanel {
    pub fn initialize(store: PreferenceStore) -> Self {
        let enhanced = store.get_bool(ENHANCED_PREF_KEY, false);

        let dials = DialName::ALL
            .into_iter()
            .map(|name| {
                let mut dial = TuningDial::new(name);
                if let Some(saved) = store.get_parsed::<i64>(&name.persisted_key()) {
                    dial.set_value(saved);
                }
                dial
            })
            .collect();

        info!("Parameter panel ready (enhanced mode: {})", enhanced);
        Self {
            store,
            enhanced,
            tuning_section_visible: enhanced,
            dials,
        }
    }

    pub fn on_toggle_change(&mut self, enabled: bool) {
        self.enhanced = enabled;
        self.tuning_section_visible = enabled;
        self.store.set_bool(ENHANCED_PREF_KEY, enabled);
        debug!("Enhanced mode toggled to {}", enabled);
    }

    /// Applies one discrete dial input and returns the value the dial settled on.
    pub fn on_dial_input(&mut self, name: DialName, raw: i64) -> u8 {
        let value = match self.dials.iter_mut().find(|dial| dial.name == name) {
            Some(dial) => dial.set_value(raw),
            None => return name.default_value(),
        };
        self.store.set(&name.persisted_key(), value.to_string());
        debug!("Dial {} set to {}", name, value);
        value
    }

    /// Reads the controls, not the store.
    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            use_enhanced: self.enhanced,
            tuning: self.dials.iter().map(|dial| (dial.name, dial.value)).collect(),
        }
    }

    pub fn is_enhanced(&self) -> bool {
        self.enhanced
    }

    pub fn tuning_section_visible(&self) -> bool {
        self.tuning_section_visible
    }

    pub fn dials(&self) -> &[TuningDial] {
        &self.dials
    }

    pub fn dial(&self, name: DialName) -> Option<&TuningDial> {
        self.dials.iter().find(|dial| dial.name == name)
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }
}
