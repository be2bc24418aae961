/// What a surface is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceKind {
    #[default]
    Main,
    /// Main view plus the debug line pass
    Debug,
    /// Editor over other surfaces' scenes; draws no scene of its own
    Hierarchy,
    Gui,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 4] = [Self::Main, Self::Debug, Self::Hierarchy, Self::Gui];

    pub fn document_name(&self) -> &'static str {
        match self {
            Self::Main => "WINDOW_MAIN",
            Self::Debug => "WINDOW_DEBUG",
            Self::Hierarchy => "WINDOW_HIERARCHY",
            Self::Gui => "WINDOW_GUI",
        }
    }

    pub fn from_document(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.document_name() == name)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Debug => "Debug",
            Self::Hierarchy => "Hierarchy",
            Self::Gui => "GUI",
        }
    }

    /// Whether this surface renders a scene and shows up in the
    /// cross-surface renderer list.
    pub fn draws_scene(&self) -> bool {
        *self != Self::Hierarchy
    }
}
