use std::fmt::{Display, Formatter};

/// Legend shown next to every set of predictions.
pub const LEGEND: &str = "buildings: 0, forest: 1, glacier: 2";

/// The class a model predicts. The integer is whatever the model emits; it is
/// not checked against [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassLabel(pub i64);

impl ClassLabel {
    pub fn scene(self) -> Option<Scene> {
        Scene::ALL.into_iter().find(|s| s.label() == self)
    }
}

impl Display for ClassLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ClassLabel {
    fn from(v: i64) -> Self {
        ClassLabel(v)
    }
}

/// The scene categories the shipped models were trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    Buildings,
    Forest,
    Glacier,
}

impl Scene {
    pub const ALL: [Scene; 3] = [Scene::Buildings, Scene::Forest, Scene::Glacier];

    pub fn name(self) -> &'static str {
        match self {
            Scene::Buildings => "buildings",
            Scene::Forest => "forest",
            Scene::Glacier => "glacier",
        }
    }

    pub fn label(self) -> ClassLabel {
        match self {
            Scene::Buildings => ClassLabel(0),
            Scene::Forest => ClassLabel(1),
            Scene::Glacier => ClassLabel(2),
        }
    }
}

impl Display for Scene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
