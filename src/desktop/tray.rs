use image::{ImageBuffer, Rgba};
use tray_icon::{
    Icon, TrayIcon, TrayIconBuilder,
    menu::{Menu, MenuItem, PredefinedMenuItem},
};

use crate::error::{NotesError, Result};

/// Holds the menu items the event loop matches events against.
pub struct MenuItems {
    pub open_item: MenuItem,
    pub close_item: MenuItem,
    pub quit_item: MenuItem,
}

/// Build the tray dropdown menu and return both the menu and item handles.
pub fn build_menu() -> (Menu, MenuItems) {
    let menu = Menu::new();

    let open_item = MenuItem::new("Open Notes", true, None);
    let close_item = MenuItem::new("Close Notes", true, None);
    let quit_item = MenuItem::new("Quit", true, None);

    let _ = menu.append_items(&[
        &open_item,
        &close_item,
        &PredefinedMenuItem::separator(),
        &quit_item,
    ]);

    let items = MenuItems {
        open_item,
        close_item,
        quit_item,
    };

    (menu, items)
}

/// Icon side length in pixels.
const ICON_SIZE: u32 = 18;

/// RGBA pixels for an 18x18 note icon: a page outline with three text lines.
/// Black fill; macOS template mode inverts it to match the menu bar theme.
fn icon_pixels() -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let (left, right, top, bottom) = (3u32, 14u32, 1u32, 16u32);

    ImageBuffer::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let inside = (left..=right).contains(&x) && (top..=bottom).contains(&y);
        let border = inside && (x == left || x == right || y == top || y == bottom);
        let text_line = x > left + 1 && x < right - 1 && matches!(y, 5 | 8 | 11);
        if border || text_line {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

pub fn generate_icon() -> Result<Icon> {
    let img = icon_pixels();
    let (width, height) = img.dimensions();
    Icon::from_rgba(img.into_raw(), width, height)
        .map_err(|e| NotesError::Host(format!("failed to create tray icon: {e}")))
}

/// Build the tray icon with the given menu.
pub fn build_tray(menu: Menu, icon: Icon, title: &str) -> Result<TrayIcon> {
    TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(title)
        .with_icon(icon)
        .with_icon_as_template(true)
        .with_menu_on_left_click(true)
        .build()
        .map_err(|e| NotesError::Host(format!("failed to build tray icon: {e}")))
}
