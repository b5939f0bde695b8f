//! Engine configuration, presets and validation
//!
//! Everything the host can tune lives here. Aesthetic constants are
//! exposed as fields with defaults rather than baked into the simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_AREA_PER_ENTITY;
use crate::error::ConfigError;
use crate::palette::{Palette, PalettePreset};
use crate::sim::silhouette::Silhouette;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live transient effects for this preset
    pub fn max_effects(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }

    /// Maximum live pointer-trail puffs
    pub fn trail_length(&self) -> usize {
        match self {
            QualityPreset::Low => 10,
            QualityPreset::Medium => 40,
            QualityPreset::High => 80,
        }
    }

    /// Whether to render nebula background orbs
    pub fn nebula_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }

    /// Whether to run the connection pass
    pub fn connections_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Light/dark theme. Affects the palette only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Inclusive `[min, max]` range for randomized per-entity parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || self.min < 0.0 {
            return Err(ConfigError::NegativeThreshold {
                field,
                value: self.min,
            });
        }
        if !self.max.is_finite() || self.max < self.min {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// How many entities the pool holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Population {
    /// Exactly `count` entities regardless of surface size
    Fixed { count: usize },
    /// One entity per `area_per_entity` px², capped at `max`
    PerArea { area_per_entity: f32, max: usize },
}

impl Population {
    pub fn count_for(&self, width: f32, height: f32) -> usize {
        match *self {
            Population::Fixed { count } => count,
            Population::PerArea {
                area_per_entity,
                max,
            } => {
                let n = (width.max(0.0) * height.max(0.0) / area_per_entity) as usize;
                n.clamp(1, max.max(1))
            }
        }
    }
}

/// Visual/kinematic category of the steady-state entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityStyle {
    /// Anchored point with elastic return to its base position
    #[default]
    Star,
    /// Free point with constant velocity, bouncing off the edges
    Drifter,
    /// Falling streak, respawned at the top
    Raindrop,
    /// Rising, swaying candle, respawned below the bottom edge
    Candle,
    /// Point steered by the flow field
    FlowParticle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub count: Population,
    pub style: EntityStyle,
    pub radius: Span,
    /// Speed range (px/tick) for moving styles
    pub speed: Span,
    /// Pointer push multiplier for anchored styles
    pub density: Span,
    /// Streak length for raindrops, body height for candles
    pub length: Span,
    /// Optional shape the initial positions must fall inside
    pub silhouette: Option<Silhouette>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            count: Population::PerArea {
                area_per_entity: DEFAULT_AREA_PER_ENTITY,
                max: 400,
            },
            style: EntityStyle::Star,
            radius: Span::new(0.5, 2.5),
            speed: Span::new(0.0, 0.4),
            density: Span::new(1.0, 31.0),
            length: Span::new(10.0, 30.0),
            silhouette: None,
        }
    }
}

/// Whether the pointer pushes entities away or pulls them in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    Repel,
    Attract,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    pub polarity: Polarity,
    /// Relaxation constant `k` in `pos += (base - pos) / k`; must be >= 1
    pub damping: f32,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            polarity: Polarity::Repel,
            damping: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowFieldConfig {
    /// Grid cell edge in px
    pub cell_size: f32,
    /// Spatial frequency of the angle function
    pub zoom: f32,
    /// Angle multiplier (how curly the field is)
    pub curve: f32,
    /// Acceleration along the cell angle per tick
    pub acceleration: f32,
    /// Velocity multiplier per tick, in [0, 1)
    pub friction: f32,
    /// Hard cap on speed, px/tick
    pub max_speed: f32,
}

impl Default for FlowFieldConfig {
    fn default() -> Self {
        Self {
            cell_size: 20.0,
            zoom: 0.11,
            curve: 2.2,
            acceleration: 0.3,
            friction: 0.9,
            max_speed: 6.0,
        }
    }
}

/// Force-field variant applied to the pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ForceMode {
    Radial(RadialConfig),
    FlowField(FlowFieldConfig),
}

impl Default for ForceMode {
    fn default() -> Self {
        ForceMode::Radial(RadialConfig::default())
    }
}

/// Opacity curve from distance 0 (max) to the threshold (0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    #[default]
    Linear,
    Quadratic,
}

/// How the proximity pass finds candidate pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProximityStrategy {
    /// Pairwise below a size threshold, grid buckets above it
    #[default]
    Auto,
    Pairwise,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub enabled: bool,
    /// Pairs strictly closer than this are connected
    pub threshold: f32,
    pub falloff: Falloff,
    /// Opacity at distance 0
    pub max_opacity: f32,
    pub line_width: f32,
    /// Draw lines from the pointer to entities inside its radius
    pub pointer_links: bool,
    pub strategy: ProximityStrategy,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 150.0,
            falloff: Falloff::Linear,
            max_opacity: 1.0,
            line_width: 0.8,
            pointer_links: false,
            strategy: ProximityStrategy::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Interaction radius at rest
    pub radius: f32,
    /// Force multiplier at rest
    pub strength: f32,
    /// Radius multiplier while pressed
    pub press_radius_factor: f32,
    /// Strength multiplier while pressed
    pub press_strength_factor: f32,
    /// Relaxation constant for returning to baseline after release; >= 1
    pub recovery: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            radius: 150.0,
            strength: 1.0,
            press_radius_factor: 1.5,
            press_strength_factor: 2.0,
            recovery: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub ripple: bool,
    /// Ripple radius growth, px/tick
    pub ripple_growth: f32,
    pub ripple_decay: f32,
    /// Projectiles thrown per click (0 disables)
    pub burst_count: u32,
    pub burst_speed: f32,
    pub burst_spin: f32,
    pub burst_decay: f32,
    /// Spawn a floating label from the palette's label table on click
    pub labels: bool,
    pub label_decay: f32,
    /// Label size growth factor per tick
    pub label_growth: f32,
    /// Spawn trail puffs on pointer move
    pub trail: bool,
    pub trail_per_move: u32,
    /// Trail puff radius range
    pub trail_size: Span,
    /// Max initial jitter speed of a trail puff, px/tick
    pub trail_spread: f32,
    pub trail_decay: f32,
    /// Downward acceleration on trail puffs, px/tick²
    pub trail_gravity: f32,
    /// Per-tick chance of launching a shooting star
    pub shooting_star_chance: f32,
    pub shooting_star_decay: f32,
    /// Chance that a click triggers a lightning flash
    pub lightning_chance: f32,
    pub lightning_decay: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            ripple: true,
            ripple_growth: 3.0,
            ripple_decay: 0.02,
            burst_count: 0,
            burst_speed: 8.0,
            burst_spin: 0.4,
            burst_decay: 0.02,
            labels: false,
            label_decay: 0.02,
            label_growth: 1.01,
            trail: false,
            trail_per_move: 1,
            trail_size: Span::new(2.0, 5.0),
            trail_spread: 0.5,
            trail_decay: 0.04,
            trail_gravity: 0.0,
            shooting_star_chance: 0.0,
            shooting_star_decay: 0.015,
            lightning_chance: 0.0,
            lightning_decay: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// Number of drifting nebula orbs behind everything else
    pub nebula_count: usize,
    pub nebula_radius: Span,
    /// Max orb drift speed, px/tick
    pub nebula_speed: f32,
    /// Fade alpha instead of a full clear each tick (None = clear)
    pub fade: Option<f32>,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            nebula_count: 0,
            nebula_radius: Span::new(200.0, 500.0),
            nebula_speed: 0.1,
            fade: None,
        }
    }
}

/// Built-in scenes mirroring the classic backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenePreset {
    Starfield,
    Neural,
    GothamRain,
    Candles,
    BatarangCursor,
    FlowPortrait,
}

impl ScenePreset {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "starfield" | "galaxy" => Some(ScenePreset::Starfield),
            "neural" => Some(ScenePreset::Neural),
            "gotham_rain" | "rain" => Some(ScenePreset::GothamRain),
            "candles" => Some(ScenePreset::Candles),
            "batarang_cursor" | "cursor" => Some(ScenePreset::BatarangCursor),
            "flow_portrait" | "flow" => Some(ScenePreset::FlowPortrait),
            _ => None,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RNG seed; same seed and inputs give the same scene
    pub seed: u64,
    pub quality: QualityPreset,
    pub theme: Theme,
    pub palette: PalettePreset,
    /// Full palette override (theme is still applied)
    pub custom_palette: Option<Palette>,
    pub population: PopulationConfig,
    pub force: ForceMode,
    pub connections: ConnectionConfig,
    pub pointer: PointerConfig,
    pub effects: EffectsConfig,
    pub ambient: AmbientConfig,
    /// Draw a batarang glyph at the pointer, above everything else
    pub cursor_glyph: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::preset(ScenePreset::Starfield)
    }
}

impl EngineConfig {
    /// Configuration for a built-in scene
    pub fn preset(scene: ScenePreset) -> Self {
        let base = Self {
            seed: 0x5EED,
            quality: QualityPreset::default(),
            theme: Theme::default(),
            palette: PalettePreset::Starlight,
            custom_palette: None,
            population: PopulationConfig::default(),
            force: ForceMode::default(),
            connections: ConnectionConfig::default(),
            pointer: PointerConfig::default(),
            effects: EffectsConfig::default(),
            ambient: AmbientConfig::default(),
            cursor_glyph: false,
        };

        match scene {
            ScenePreset::Starfield => Self {
                connections: ConnectionConfig {
                    threshold: 141.0,
                    falloff: Falloff::Quadratic,
                    max_opacity: 1.0,
                    ..ConnectionConfig::default()
                },
                ..base
            },
            ScenePreset::Neural => Self {
                palette: PalettePreset::Gold,
                population: PopulationConfig {
                    count: Population::Fixed { count: 60 },
                    style: EntityStyle::Drifter,
                    radius: Span::new(0.5, 2.0),
                    speed: Span::new(0.0, 0.28),
                    density: Span::fixed(1.0),
                    ..PopulationConfig::default()
                },
                ambient: AmbientConfig {
                    nebula_count: 4,
                    ..AmbientConfig::default()
                },
                ..base
            },
            ScenePreset::GothamRain => Self {
                palette: PalettePreset::Gotham,
                population: PopulationConfig {
                    count: Population::PerArea {
                        area_per_entity: 2400.0,
                        max: 600,
                    },
                    style: EntityStyle::Raindrop,
                    radius: Span::fixed(1.5),
                    speed: Span::new(10.0, 25.0),
                    density: Span::fixed(0.0),
                    length: Span::new(10.0, 30.0),
                    silhouette: None,
                },
                connections: ConnectionConfig {
                    enabled: false,
                    ..ConnectionConfig::default()
                },
                pointer: PointerConfig {
                    radius: 350.0,
                    ..PointerConfig::default()
                },
                effects: EffectsConfig {
                    ripple: false,
                    labels: true,
                    lightning_chance: 0.3,
                    ..EffectsConfig::default()
                },
                ..base
            },
            ScenePreset::Candles => Self {
                palette: PalettePreset::Candlelight,
                population: PopulationConfig {
                    count: Population::PerArea {
                        area_per_entity: 40.0 * 600.0,
                        max: 40,
                    },
                    style: EntityStyle::Candle,
                    radius: Span::new(4.0, 8.0),
                    speed: Span::new(0.1, 0.4),
                    density: Span::fixed(2.0),
                    length: Span::new(60.0, 100.0),
                    silhouette: None,
                },
                connections: ConnectionConfig {
                    enabled: false,
                    ..ConnectionConfig::default()
                },
                effects: EffectsConfig {
                    ripple: false,
                    trail: true,
                    trail_per_move: 2,
                    trail_size: Span::new(1.0, 3.0),
                    trail_spread: 2.0,
                    trail_decay: 0.02,
                    trail_gravity: 0.02,
                    ..EffectsConfig::default()
                },
                ..base
            },
            ScenePreset::BatarangCursor => Self {
                palette: PalettePreset::Batcave,
                population: PopulationConfig {
                    count: Population::Fixed { count: 1 },
                    style: EntityStyle::Drifter,
                    radius: Span::fixed(0.0),
                    speed: Span::fixed(0.0),
                    density: Span::fixed(0.0),
                    ..PopulationConfig::default()
                },
                connections: ConnectionConfig {
                    enabled: false,
                    ..ConnectionConfig::default()
                },
                effects: EffectsConfig {
                    ripple: true,
                    burst_count: 3,
                    trail: true,
                    ..EffectsConfig::default()
                },
                cursor_glyph: true,
                ..base
            },
            ScenePreset::FlowPortrait => Self {
                palette: PalettePreset::Aurora,
                population: PopulationConfig {
                    count: Population::Fixed { count: 600 },
                    style: EntityStyle::FlowParticle,
                    radius: Span::new(0.8, 1.6),
                    speed: Span::new(0.0, 1.0),
                    density: Span::fixed(1.0),
                    silhouette: Some(Silhouette::WolfHead),
                    ..PopulationConfig::default()
                },
                force: ForceMode::FlowField(FlowFieldConfig::default()),
                connections: ConnectionConfig {
                    threshold: 24.0,
                    max_opacity: 0.5,
                    ..ConnectionConfig::default()
                },
                effects: EffectsConfig {
                    shooting_star_chance: 0.01,
                    ..EffectsConfig::default()
                },
                ambient: AmbientConfig {
                    fade: Some(0.1),
                    ..AmbientConfig::default()
                },
                ..base
            },
        }
    }

    /// Parse and validate a JSON config (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The palette in effect, with the theme applied
    pub fn resolved_palette(&self) -> Palette {
        match &self.custom_palette {
            Some(custom) => custom.clone().themed(self.theme),
            None => Palette::preset(self.palette, self.theme),
        }
    }

    /// Effective live-effect cap
    pub fn max_effects(&self) -> usize {
        self.quality.max_effects()
    }

    /// Effective trail cap (0 when trails are off)
    pub fn max_trail(&self) -> usize {
        if self.effects.trail {
            self.quality.trail_length()
        } else {
            0
        }
    }

    pub fn nebula_count(&self) -> usize {
        if self.quality.nebula_enabled() {
            self.ambient.nebula_count
        } else {
            0
        }
    }

    pub fn connections_enabled(&self) -> bool {
        self.connections.enabled && self.quality.connections_enabled()
    }

    /// Reject anything that would produce a blank or runaway simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.population.count {
            Population::Fixed { count } if count == 0 => {
                return Err(ConfigError::ZeroEntityCount(count));
            }
            Population::PerArea {
                area_per_entity,
                max,
            } => {
                if !area_per_entity.is_finite() || area_per_entity <= 0.0 {
                    return Err(ConfigError::InvalidAreaPerEntity(area_per_entity));
                }
                if max == 0 {
                    return Err(ConfigError::ZeroEntityCount(max));
                }
            }
            _ => {}
        }

        self.population.radius.validate("population.radius")?;
        self.population.speed.validate("population.speed")?;
        self.population.density.validate("population.density")?;
        self.population.length.validate("population.length")?;
        if let Some(silhouette) = &self.population.silhouette {
            silhouette.validate()?;
        }

        match self.force {
            ForceMode::Radial(radial) => {
                if !radial.damping.is_finite() || radial.damping < 1.0 {
                    return Err(ConfigError::UnstableDamping(radial.damping));
                }
            }
            ForceMode::FlowField(flow) => {
                if self.population.style == EntityStyle::Star {
                    return Err(ConfigError::AnchoredUnderFlowField);
                }
                positive("force.cell_size", flow.cell_size)?;
                non_negative("force.acceleration", flow.acceleration)?;
                non_negative("force.zoom", flow.zoom)?;
                positive("force.max_speed", flow.max_speed)?;
                if !flow.curve.is_finite() {
                    return Err(ConfigError::NonPositive {
                        field: "force.curve",
                        value: flow.curve,
                    });
                }
                if !(0.0..1.0).contains(&flow.friction) {
                    return Err(ConfigError::FrictionOutOfRange {
                        field: "force.friction",
                        value: flow.friction,
                    });
                }
            }
        }

        non_negative("connections.threshold", self.connections.threshold)?;
        non_negative("connections.max_opacity", self.connections.max_opacity)?;
        non_negative("connections.line_width", self.connections.line_width)?;

        positive("pointer.radius", self.pointer.radius)?;
        non_negative("pointer.strength", self.pointer.strength)?;
        positive("pointer.press_radius_factor", self.pointer.press_radius_factor)?;
        positive(
            "pointer.press_strength_factor",
            self.pointer.press_strength_factor,
        )?;
        if !self.pointer.recovery.is_finite() || self.pointer.recovery < 1.0 {
            return Err(ConfigError::UnstableDamping(self.pointer.recovery));
        }

        let fx = &self.effects;
        non_negative("effects.ripple_growth", fx.ripple_growth)?;
        non_negative("effects.trail_spread", fx.trail_spread)?;
        fx.trail_size.validate("effects.trail_size")?;
        positive("effects.ripple_decay", fx.ripple_decay)?;
        positive("effects.burst_decay", fx.burst_decay)?;
        positive("effects.label_decay", fx.label_decay)?;
        positive("effects.trail_decay", fx.trail_decay)?;
        positive("effects.shooting_star_decay", fx.shooting_star_decay)?;
        positive("effects.lightning_decay", fx.lightning_decay)?;
        non_negative("effects.shooting_star_chance", fx.shooting_star_chance)?;
        non_negative("effects.lightning_chance", fx.lightning_chance)?;

        self.ambient.nebula_radius.validate("ambient.nebula_radius")?;
        non_negative("ambient.nebula_speed", self.ambient.nebula_speed)?;
        if let Some(fade) = self.ambient.fade {
            positive("ambient.fade", fade)?;
        }

        if self.resolved_palette().entities.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeThreshold { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_validate() {
        for scene in [
            ScenePreset::Starfield,
            ScenePreset::Neural,
            ScenePreset::GothamRain,
            ScenePreset::Candles,
            ScenePreset::BatarangCursor,
            ScenePreset::FlowPortrait,
        ] {
            let config = EngineConfig::preset(scene);
            assert!(config.validate().is_ok(), "{scene:?} should validate");
        }
    }

    #[test]
    fn test_zero_count_rejected() {
        let mut config = EngineConfig::default();
        config.population.count = Population::Fixed { count: 0 };
        assert_eq!(config.validate(), Err(ConfigError::ZeroEntityCount(0)));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = EngineConfig::default();
        config.connections.threshold = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeThreshold {
                field: "connections.threshold",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_pointer_radius_rejected() {
        let mut config = EngineConfig::default();
        config.pointer.radius = -150.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "pointer.radius",
                ..
            })
        ));
    }

    #[test]
    fn test_friction_must_be_below_one() {
        let mut config = EngineConfig::preset(ScenePreset::FlowPortrait);
        if let ForceMode::FlowField(ref mut flow) = config.force {
            flow.friction = 1.0;
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FrictionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_stars_rejected_under_flow_field() {
        let mut config = EngineConfig::default();
        config.population.count = Population::Fixed { count: 20 };
        config.force = ForceMode::FlowField(FlowFieldConfig::default());
        assert_eq!(config.validate(), Err(ConfigError::AnchoredUnderFlowField));

        config.population.style = EntityStyle::Drifter;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_damping_below_one_rejected() {
        let mut config = EngineConfig::default();
        config.force = ForceMode::Radial(RadialConfig {
            damping: 0.5,
            ..RadialConfig::default()
        });
        assert_eq!(config.validate(), Err(ConfigError::UnstableDamping(0.5)));
    }

    #[test]
    fn test_empty_custom_palette_rejected() {
        let mut config = EngineConfig::default();
        let mut palette = config.resolved_palette();
        palette.entities.clear();
        config.custom_palette = Some(palette);
        assert_eq!(config.validate(), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{
            "seed": 42,
            "theme": "light",
            "population": { "count": { "kind": "fixed", "count": 100 } },
            "force": { "mode": "radial", "damping": 12.0 }
        }"#;
        let config = EngineConfig::from_json(json).expect("valid json");
        assert_eq!(config.seed, 42);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.population.count, Population::Fixed { count: 100 });
        assert!(matches!(config.force, ForceMode::Radial(r) if r.damping == 12.0));
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let json = r#"{ "population": { "count": { "kind": "fixed", "count": 0 } } }"#;
        assert_eq!(
            EngineConfig::from_json(json),
            Err(ConfigError::ZeroEntityCount(0))
        );
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_per_area_population() {
        let pop = Population::PerArea {
            area_per_entity: 9000.0,
            max: 1000,
        };
        assert_eq!(pop.count_for(900.0, 1000.0), 100);
        assert_eq!(pop.count_for(0.0, 0.0), 1);
        let capped = Population::PerArea {
            area_per_entity: 1.0,
            max: 50,
        };
        assert_eq!(capped.count_for(100.0, 100.0), 50);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(ScenePreset::parse("gotham-rain"), Some(ScenePreset::GothamRain));
    }

    #[test]
    fn test_low_quality_disables_extras() {
        let mut config = EngineConfig::preset(ScenePreset::Neural);
        config.quality = QualityPreset::Low;
        assert_eq!(config.nebula_count(), 0);
        assert!(!config.connections_enabled());
    }
}
