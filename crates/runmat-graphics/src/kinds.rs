use std::fmt;

/// Closed family of graphics object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Root,
    Figure,
    Axes,
    Line,
    Text,
    Image,
    Patch,
    Surface,
    Light,
    HgGroup,
    UiMenu,
    UiControl,
    UiButtonGroup,
    UiPanel,
    UiContextMenu,
    UiToolbar,
    UiPushTool,
    UiToggleTool,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 18] = [
        ObjectKind::Root,
        ObjectKind::Figure,
        ObjectKind::Axes,
        ObjectKind::Line,
        ObjectKind::Text,
        ObjectKind::Image,
        ObjectKind::Patch,
        ObjectKind::Surface,
        ObjectKind::Light,
        ObjectKind::HgGroup,
        ObjectKind::UiMenu,
        ObjectKind::UiControl,
        ObjectKind::UiButtonGroup,
        ObjectKind::UiPanel,
        ObjectKind::UiContextMenu,
        ObjectKind::UiToolbar,
        ObjectKind::UiPushTool,
        ObjectKind::UiToggleTool,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Root => "root",
            ObjectKind::Figure => "figure",
            ObjectKind::Axes => "axes",
            ObjectKind::Line => "line",
            ObjectKind::Text => "text",
            ObjectKind::Image => "image",
            ObjectKind::Patch => "patch",
            ObjectKind::Surface => "surface",
            ObjectKind::Light => "light",
            ObjectKind::HgGroup => "hggroup",
            ObjectKind::UiMenu => "uimenu",
            ObjectKind::UiControl => "uicontrol",
            ObjectKind::UiButtonGroup => "uibuttongroup",
            ObjectKind::UiPanel => "uipanel",
            ObjectKind::UiContextMenu => "uicontextmenu",
            ObjectKind::UiToolbar => "uitoolbar",
            ObjectKind::UiPushTool => "uipushtool",
            ObjectKind::UiToggleTool => "uitoggletool",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|k| k.name() == lowered)
    }

    /// Split `"lineLineWidth"` style keys into kind and property name,
    /// preferring the longest kind name that prefixes the key.
    pub fn split_prefixed(key: &str) -> Option<(ObjectKind, String)> {
        let lowered = key.to_ascii_lowercase();
        let mut kinds: Vec<ObjectKind> = Self::ALL.to_vec();
        kinds.sort_by_key(|k| std::cmp::Reverse(k.name().len()));
        kinds.into_iter().find_map(|k| {
            lowered
                .strip_prefix(k.name())
                .filter(|rest| !rest.is_empty())
                .map(|rest| (k, rest.to_string()))
        })
    }

    pub fn is_figure(self) -> bool {
        self == ObjectKind::Figure
    }

    /// Kinds whose data feeds axes limit computation.
    pub fn has_data_limits(self) -> bool {
        matches!(
            self,
            ObjectKind::Line
                | ObjectKind::Image
                | ObjectKind::Patch
                | ObjectKind::Surface
                | ObjectKind::HgGroup
                | ObjectKind::Text
        )
    }

    /// Kinds positioned in their container's units (pixel bounding box).
    pub fn is_ui_positioned(self) -> bool {
        matches!(
            self,
            ObjectKind::UiControl | ObjectKind::UiPanel | ObjectKind::UiButtonGroup
        )
    }

    /// Which kinds may hold a child of this kind.
    pub fn accepts_parent(self, parent: ObjectKind) -> bool {
        use ObjectKind::*;
        match self {
            Root => false,
            Figure => parent == Root,
            Axes | UiControl | UiPanel | UiButtonGroup => {
                matches!(parent, Figure | UiPanel | UiButtonGroup)
            }
            Line | Text | Image | Patch | Surface | Light | HgGroup => {
                matches!(parent, Axes | HgGroup)
            }
            UiMenu => matches!(parent, Figure | UiMenu | UiContextMenu),
            UiContextMenu | UiToolbar => parent == Figure,
            UiPushTool | UiToggleTool => parent == UiToolbar,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
