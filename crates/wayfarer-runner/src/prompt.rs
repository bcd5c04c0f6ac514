//! Prompt template loading and rendering via `minijinja`.
//!
//! Templates live on disk (default `templates/`) so operators can tune the
//! wording without recompiling. The engine's request is flattened into a
//! template context with pre-rendered lines for vision and memory, so the
//! templates only loop over strings.

use minijinja::Environment;
use serde_json::{Value, json};
use wayfarer_types::{DecisionRequest, TradeRequest, VISION_CENTER_ROW, VisionWindow};

use crate::error::RunnerError;

/// Template files the directory must contain, with their registered names.
const TEMPLATES: [(&str, &str); 3] = [
    ("system", "system.j2"),
    ("decision", "decision.j2"),
    ("trade", "trade.j2"),
];

/// Loaded prompt templates.
pub struct PromptEngine {
    env: Environment<'static>,
}

/// A prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message with the rules of the world.
    pub system: String,
    /// User message with the situation and the question.
    pub user: String,
}

impl PromptEngine {
    /// Load `system.j2`, `decision.j2` and `trade.j2` from `templates_dir`.
    pub fn new(templates_dir: &str) -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        for (name, file) in TEMPLATES {
            let source = load_template(templates_dir, file)?;
            env.add_template_owned(name, source)
                .map_err(|e| RunnerError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the prompt for a movement decision.
    pub fn render_decision(&self, request: &DecisionRequest) -> Result<RenderedPrompt, RunnerError> {
        let ctx = decision_context(request)?;
        Ok(RenderedPrompt {
            system: self.render("system", &ctx)?,
            user: self.render("decision", &ctx)?,
        })
    }

    /// Render the prompt for one negotiation round.
    pub fn render_trade(&self, request: &TradeRequest) -> Result<RenderedPrompt, RunnerError> {
        let ctx = trade_context(request)?;
        Ok(RenderedPrompt {
            system: self.render("system", &ctx)?,
            user: self.render("trade", &ctx)?,
        })
    }

    fn render(&self, name: &str, ctx: &Value) -> Result<String, RunnerError> {
        self.env
            .get_template(name)
            .map_err(|e| RunnerError::Template(format!("missing {name} template: {e}")))?
            .render(ctx)
            .map_err(|e| RunnerError::Template(format!("{name} render failed: {e}")))
    }
}

fn decision_context(request: &DecisionRequest) -> Result<Value, RunnerError> {
    let memory: Vec<&str> = request.memory_summary.lines().collect();
    Ok(json!({
        "turn": request.turn,
        "attempt": request.attempt,
        "agent": serde_json::to_value(request.agent)?,
        "position": request.agent.position.to_string(),
        "map_width": request.map_width,
        "map_height": request.map_height,
        "vision": vision_lines(&request.vision),
        "memory": memory,
        "recent_turns": request.recent_turns,
        "notifications": request.notifications,
    }))
}

fn trade_context(request: &TradeRequest) -> Result<Value, RunnerError> {
    Ok(json!({
        "turn": request.turn,
        "round": request.round,
        "agent": serde_json::to_value(request.agent)?,
        "position": request.agent.position.to_string(),
        "trader": serde_json::to_value(request.trader)?,
        "current_offer": request.current_offer.map(|offer| offer.to_string()),
    }))
}

/// One line per visible cell, labelled with its offset from the agent.
fn vision_lines(window: &VisionWindow) -> Vec<String> {
    let center = i64::try_from(VISION_CENTER_ROW).unwrap_or_default();
    window
        .visible()
        .map(|(row, col, view)| {
            let dy = i64::try_from(row).unwrap_or_default().saturating_sub(center);
            let dx = i64::try_from(col).unwrap_or_default();
            format!("{dx:+},{dy:+}: {}", view.describe())
        })
        .collect()
}

/// Read a template file from disk.
fn load_template(dir: &str, filename: &str) -> Result<String, RunnerError> {
    let path = format!("{dir}/{filename}");
    std::fs::read_to_string(&path)
        .map_err(|e| RunnerError::Template(format!("failed to read {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use wayfarer_types::{
        AgentState, Coordinate, TerrainCost, TerrainKind, Tile, TileView, TradeOffer,
        TraderPersonality,
    };

    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let unique = format!(
            "wayfarer_{tag}_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    fn write_templates(dir: &std::path::Path) {
        std::fs::write(dir.join("system.j2"), "Grid {{ map_width }} wide.").ok();
        std::fs::write(
            dir.join("decision.j2"),
            "Turn {{ turn }} at {{ position }}\n{% for v in vision %}{{ v }}\n{% endfor %}\
             {% for m in memory %}SEEN {{ m }}\n{% endfor %}\
             {% for n in notifications %}NOTE {{ n }}\n{% endfor %}",
        )
        .ok();
        std::fs::write(
            dir.join("trade.j2"),
            "Round {{ round }} with {{ trader }}{% if current_offer %}: {{ current_offer }}{% endif %}",
        )
        .ok();
    }

    fn agent() -> AgentState {
        AgentState {
            position: Coordinate::new(3, 1),
            food: 10,
            water: 10,
            energy: 10,
            gold: 4,
        }
    }

    #[test]
    fn decision_prompt_lists_vision_and_notes() {
        let dir = temp_dir("decision_templates");
        write_templates(&dir);
        let engine = PromptEngine::new(dir.to_str().unwrap_or_default());
        assert!(engine.is_ok());
        let Ok(engine) = engine else { return };

        let mut vision = VisionWindow::empty(Coordinate::new(3, 1));
        let view = TileView::of(&Tile::bare(TerrainKind::Forest), TerrainCost::new(2, 2, 1));
        vision.set(VISION_CENTER_ROW, 1, Some(view));
        let request = DecisionRequest {
            turn: 7,
            attempt: 1,
            agent: agent(),
            map_width: 20,
            map_height: 5,
            vision,
            memory: Vec::new(),
            memory_summary: String::from("(-1, 0) Plains\n(-1, 1) Water [food]"),
            recent_turns: String::new(),
            notifications: vec![String::from("west is off the map")],
        };

        let prompt = engine.render_decision(&request);
        assert!(prompt.is_ok());
        let Ok(prompt) = prompt else { return };
        assert_eq!(prompt.system, "Grid 20 wide.");
        assert!(prompt.user.contains("Turn 7 at (3, 1)"));
        assert!(prompt.user.contains("+1,+0: Forest"));
        assert!(prompt.user.contains("NOTE west is off the map"));
        assert!(prompt.user.contains("SEEN (-1, 1) Water [food]"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn trade_prompt_shows_standing_offer() {
        let dir = temp_dir("trade_templates");
        write_templates(&dir);
        let Ok(engine) = PromptEngine::new(dir.to_str().unwrap_or_default()) else {
            std::fs::remove_dir_all(&dir).ok();
            return;
        };

        let offer = TradeOffer {
            food_to_player: 1,
            water_to_player: 1,
            gold_to_trader: 3,
            ..TradeOffer::default()
        };
        let request = TradeRequest {
            turn: 2,
            round: 1,
            agent: agent(),
            trader: TraderPersonality::Stingy,
            current_offer: Some(offer),
        };
        let prompt = engine.render_trade(&request);
        assert!(prompt.is_ok_and(|p| p.user.starts_with("Round 1 with Stingy: ")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_template_is_an_error() {
        let dir = temp_dir("missing_templates");
        std::fs::write(dir.join("system.j2"), "only this").ok();
        assert!(matches!(
            PromptEngine::new(dir.to_str().unwrap_or_default()),
            Err(RunnerError::Template(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
