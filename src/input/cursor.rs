//! Window component → pointer hints
//!
//! Hit-test components reported by the windowing layer decide which cursor
//! image to show and whether a drag would move or resize the window.

/// Hit-test component under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowComponent {
    Nowhere,
    Client,
    Caption,
    Left,
    Right,
    Top,
    TopLeft,
    TopRight,
    Bottom,
    BottomLeft,
    BottomRight,
}

impl WindowComponent {
    /// From a numeric hit-test code (HTCLIENT = 1, HTCAPTION = 2, HTLEFT = 10 ...)
    pub fn from_hit_test(code: i32) -> Self {
        match code {
            1 => WindowComponent::Client,
            2 => WindowComponent::Caption,
            10 => WindowComponent::Left,
            11 => WindowComponent::Right,
            12 => WindowComponent::Top,
            13 => WindowComponent::TopLeft,
            14 => WindowComponent::TopRight,
            15 => WindowComponent::Bottom,
            16 => WindowComponent::BottomLeft,
            17 => WindowComponent::BottomRight,
            _ => WindowComponent::Nowhere,
        }
    }
}

/// Where in the window the pointer is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLocation {
    Interior,
    Titlebar,
    ResizingTop,
    ResizingBottom,
    ResizingLeft,
    ResizingRight,
    ResizingTopLeft,
    ResizingTopRight,
    ResizingBottomLeft,
    ResizingBottomRight,
}

/// Effect of dragging the component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsChange {
    None,
    Repositions,
    Resizes,
}

/// Cursor image id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorImage {
    /// Nothing set yet (after leave)
    Unset,
    LeftPtr,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

pub fn location_for_component(component: WindowComponent) -> WindowLocation {
    match component {
        WindowComponent::Caption => WindowLocation::Titlebar,
        WindowComponent::TopLeft => WindowLocation::ResizingTopLeft,
        WindowComponent::Top => WindowLocation::ResizingTop,
        WindowComponent::TopRight => WindowLocation::ResizingTopRight,
        WindowComponent::Left => WindowLocation::ResizingLeft,
        WindowComponent::BottomLeft => WindowLocation::ResizingBottomLeft,
        WindowComponent::Right => WindowLocation::ResizingRight,
        WindowComponent::BottomRight => WindowLocation::ResizingBottomRight,
        WindowComponent::Bottom => WindowLocation::ResizingBottom,
        WindowComponent::Client | WindowComponent::Nowhere => WindowLocation::Interior,
    }
}

pub fn bounds_change_for_component(component: WindowComponent) -> BoundsChange {
    match component {
        WindowComponent::Caption => BoundsChange::Repositions,
        WindowComponent::TopLeft
        | WindowComponent::Top
        | WindowComponent::TopRight
        | WindowComponent::Left
        | WindowComponent::BottomLeft
        | WindowComponent::Right
        | WindowComponent::BottomRight
        | WindowComponent::Bottom => BoundsChange::Resizes,
        WindowComponent::Client | WindowComponent::Nowhere => BoundsChange::None,
    }
}

pub fn cursor_for_component(component: WindowComponent) -> CursorImage {
    match location_for_component(component) {
        WindowLocation::ResizingTop => CursorImage::Top,
        WindowLocation::ResizingBottom => CursorImage::Bottom,
        WindowLocation::ResizingLeft => CursorImage::Left,
        WindowLocation::ResizingRight => CursorImage::Right,
        WindowLocation::ResizingTopLeft => CursorImage::TopLeft,
        WindowLocation::ResizingTopRight => CursorImage::TopRight,
        WindowLocation::ResizingBottomLeft => CursorImage::BottomLeft,
        WindowLocation::ResizingBottomRight => CursorImage::BottomRight,
        WindowLocation::Interior | WindowLocation::Titlebar => CursorImage::LeftPtr,
    }
}
