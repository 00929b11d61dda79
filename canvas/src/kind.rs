//! Item kinds, their capability table, default payloads, and typed data access.
//!
//! Behavior that differs by kind is looked up in [`KIND_SPECS`] rather than
//! dispatched through per-kind types, so the item store stays kind-agnostic.
//! The `data` payload is an open JSON object; [`ItemData`] gives typed,
//! defaulting access to the fields the built-in kinds use.

#[cfg(test)]
#[path = "kind_test.rs"]
mod kind_test;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::consts::DEFAULT_STROKE_WIDTH;
use crate::viewport::{Point, Size};

/// Number of days ahead a new goal's target date is set.
const GOAL_HORIZON_DAYS: i64 = 30;

/// The kind of a board item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Colored note with a title and free text.
    StickyNote,
    /// Titled checklist of tasks.
    TodoList,
    /// Goal with a description and a target date.
    GoalNote,
    /// Card pointing at an external URL.
    Link,
    /// Calendar holding a list of events.
    Calendar,
    /// Freehand pen stroke.
    DrawingPath,
}

/// Capabilities and defaults for one item kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub kind: ItemKind,
    /// Name used by the persistence service.
    pub wire_name: &'static str,
    /// Size given to a newly created item.
    pub default_size: Size,
    /// Fill color used when the payload has none.
    pub default_color: &'static str,
    /// Shows resize handles when selected.
    pub resizable: bool,
    /// Has a kind-specific overlay editor.
    pub overlay_editor: bool,
    /// Double-clicking the body opens the overlay editor.
    pub double_click_edits: bool,
}

/// Lookup table of every item kind.
pub const KIND_SPECS: [KindSpec; 6] = [
    KindSpec {
        kind: ItemKind::StickyNote,
        wire_name: "sticky_note",
        default_size: Size { width: 150.0, height: 120.0 },
        default_color: "#fff59d",
        resizable: true,
        overlay_editor: true,
        double_click_edits: true,
    },
    KindSpec {
        kind: ItemKind::TodoList,
        wire_name: "todo_list",
        default_size: Size { width: 200.0, height: 200.0 },
        default_color: "#e3f2fd",
        resizable: true,
        overlay_editor: true,
        double_click_edits: true,
    },
    KindSpec {
        kind: ItemKind::GoalNote,
        wire_name: "goal_note",
        default_size: Size { width: 220.0, height: 180.0 },
        default_color: "#e9f2ff",
        resizable: true,
        overlay_editor: true,
        double_click_edits: true,
    },
    KindSpec {
        kind: ItemKind::Link,
        wire_name: "link",
        default_size: Size { width: 200.0, height: 100.0 },
        default_color: "#e9f2ff",
        resizable: true,
        overlay_editor: true,
        double_click_edits: true,
    },
    KindSpec {
        kind: ItemKind::Calendar,
        wire_name: "calendar",
        default_size: Size { width: 300.0, height: 250.0 },
        default_color: "#ffffff",
        resizable: true,
        overlay_editor: true,
        double_click_edits: true,
    },
    KindSpec {
        kind: ItemKind::DrawingPath,
        wire_name: "drawing_path",
        default_size: Size { width: 50.0, height: 30.0 },
        default_color: "#1F1A17",
        resizable: false,
        overlay_editor: false,
        double_click_edits: false,
    },
];

impl ItemKind {
    /// Every kind, in table order.
    pub const ALL: [ItemKind; 6] = [
        Self::StickyNote,
        Self::TodoList,
        Self::GoalNote,
        Self::Link,
        Self::Calendar,
        Self::DrawingPath,
    ];

    /// Table entry for this kind.
    #[must_use]
    pub fn spec(self) -> &'static KindSpec {
        match self {
            Self::StickyNote => &KIND_SPECS[0],
            Self::TodoList => &KIND_SPECS[1],
            Self::GoalNote => &KIND_SPECS[2],
            Self::Link => &KIND_SPECS[3],
            Self::Calendar => &KIND_SPECS[4],
            Self::DrawingPath => &KIND_SPECS[5],
        }
    }

    /// Name used by the persistence service.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        self.spec().wire_name
    }

    /// Parse a persistence-service type name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        KIND_SPECS
            .iter()
            .find(|spec| spec.wire_name == name)
            .map(|spec| spec.kind)
    }

    #[must_use]
    pub fn is_resizable(self) -> bool {
        self.spec().resizable
    }

    #[must_use]
    pub fn opens_editor_on_double_click(self) -> bool {
        let spec = self.spec();
        spec.overlay_editor && spec.double_click_edits
    }

    /// Payload given to a newly created item of this kind.
    #[must_use]
    pub fn default_data(self) -> Value {
        let color = self.spec().default_color;
        match self {
            Self::StickyNote => json!({
                "title": "New Note",
                "text": "",
                "color": color,
                "fontSize": 16,
            }),
            Self::TodoList => json!({
                "title": "New Todo List",
                "color": color,
                "tasks": [
                    { "id": "new1", "text": "Add your first task", "completed": false }
                ],
            }),
            Self::GoalNote => json!({
                "title": "New Goal",
                "description": "Describe your goal here",
                "goalDate": default_goal_date(),
                "color": color,
            }),
            Self::Link => json!({
                "title": "Example Link",
                "url": "https://example.com",
                "color": color,
                "fontSize": 16,
            }),
            Self::Calendar => json!({
                "title": "Calendar",
                "events": [],
                "color": color,
            }),
            Self::DrawingPath => json!({
                "points": [],
                "color": color,
                "strokeWidth": DEFAULT_STROKE_WIDTH,
            }),
        }
    }
}

/// Today plus the goal horizon, formatted `YYYY-MM-DD`.
fn default_goal_date() -> String {
    let today = time::OffsetDateTime::now_utc().date();
    today
        .checked_add(time::Duration::days(GOAL_HORIZON_DAYS))
        .unwrap_or(today)
        .to_string()
}

/// One entry of a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// One entry of a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Typed access to common fields of an item's `data` payload.
pub struct ItemData<'a> {
    value: &'a Value,
}

impl<'a> ItemData<'a> {
    /// Wrap a reference to a `data` JSON value for typed access.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    fn str_field(&self, key: &str) -> &'a str {
        self.value.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Title line. Empty string when absent.
    #[must_use]
    pub fn title(&self) -> &'a str {
        self.str_field("title")
    }

    /// Body text. Empty string when absent.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.str_field("text")
    }

    /// Goal description. Empty string when absent.
    #[must_use]
    pub fn description(&self) -> &'a str {
        self.str_field("description")
    }

    /// Link target. Empty string when absent.
    #[must_use]
    pub fn url(&self) -> &'a str {
        self.str_field("url")
    }

    /// Goal target date as stored (`YYYY-MM-DD`), if any.
    #[must_use]
    pub fn goal_date(&self) -> Option<&'a str> {
        self.value.get("goalDate").and_then(Value::as_str)
    }

    /// Fill color, falling back to the kind's default.
    #[must_use]
    pub fn color(&self, kind: ItemKind) -> &'a str {
        self.value
            .get("color")
            .and_then(Value::as_str)
            .unwrap_or(kind.spec().default_color)
    }

    /// Font size in board units. Defaults to `16.0`.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.value
            .get("fontSize")
            .and_then(Value::as_f64)
            .unwrap_or(16.0)
    }

    /// Stroke width in board units.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.value
            .get("strokeWidth")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_STROKE_WIDTH)
    }

    /// Todo tasks in order. Entries that do not decode are skipped.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.decode_list("tasks")
    }

    /// Calendar events in order. Entries that do not decode are skipped.
    #[must_use]
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.decode_list("events")
    }

    /// Stroke points relative to the item origin.
    #[must_use]
    pub fn points(&self) -> Vec<Point> {
        let Some(raw) = self.value.get("points").and_then(Value::as_array) else {
            return Vec::new();
        };
        raw.iter()
            .filter_map(|pair| {
                let pair = pair.as_array()?;
                let x = pair.first()?.as_f64()?;
                let y = pair.get(1)?.as_f64()?;
                Some(Point::new(x, y))
            })
            .collect()
    }

    fn decode_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.value.get(key).and_then(Value::as_array) else {
            return Vec::new();
        };
        raw.iter()
            .filter_map(|entry| match T::deserialize(entry) {
                Ok(decoded) => Some(decoded),
                Err(_) => None,
            })
            .collect()
    }
}

/// Encode stroke points for the `points` field of a drawing payload.
#[must_use]
pub fn encode_points(points: &[Point]) -> Value {
    Value::Array(points.iter().map(|p| json!([p.x, p.y])).collect())
}
