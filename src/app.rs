//! Interactive window: polls input, feeds the session, presents frames.

use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Scale, Window, WindowOptions};
use tracing::info;

use crate::error::Result;
use crate::session::{Action, FillMode, Session};

const TITLE: &str = "Biome Mapper";

/// Map a key press to its command.
pub fn action_for_key(key: Key) -> Option<Action> {
    match key {
        Key::Escape => Some(Action::Quit),
        Key::R => Some(Action::Regenerate(FillMode::ColorStatic)),
        Key::S => Some(Action::Regenerate(FillMode::GreyStatic)),
        Key::G => Some(Action::Regenerate(FillMode::GreyscaleNoise)),
        Key::C => Some(Action::Regenerate(FillMode::LandGrowth)),
        Key::M => Some(Action::Regenerate(FillMode::BiomeMap)),
        Key::N => Some(Action::NewSeed),
        Key::Up | Key::Equal | Key::NumPadPlus => Some(Action::FrequencyUp),
        Key::Down | Key::Minus | Key::NumPadMinus => Some(Action::FrequencyDown),
        Key::E => Some(Action::Export),
        _ => None,
    }
}

fn print_controls() {
    info!("controls:");
    info!("  M: biome map      N: new seed + biome map");
    info!("  G: greyscale noise  R: colour static  S: greyscale static");
    info!("  C: land growth automaton");
    info!("  Up/Down: frequency  E: export bitmaps");
    info!("  drag: pan  wheel: zoom  Esc: quit");
}

/// Run the control loop until the user quits or closes the window.
///
/// Each iteration applies at most one command, then pan/zoom input, then
/// presents a frame. Regeneration blocks the loop until it completes.
pub fn run(session: &mut Session) -> Result<()> {
    let width = session.config().screen_width;
    let height = session.config().screen_height;

    let mut window = Window::new(
        TITLE,
        width,
        height,
        WindowOptions {
            resize: false,
            scale: Scale::X1,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(session.config().target_fps);
    print_controls();

    let mut frame = vec![0u32; width * height];
    let mut needs_redraw = true;
    let mut last_mouse: Option<(f32, f32)> = None;

    let started = Instant::now();
    let mut fps_check = started;
    let mut frames = 0u32;

    while session.is_running() {
        if !window.is_open() {
            session.handle(Action::Quit)?;
            break;
        }

        if let Some(action) = window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .find_map(action_for_key)
        {
            session.handle(action)?;
            needs_redraw = true;
        }

        // Left button held: pan by cursor motion since the last frame.
        let mouse = window.get_mouse_pos(MouseMode::Clamp);
        if window.get_mouse_down(MouseButton::Left) {
            if let (Some((mx, my)), Some((lx, ly))) = (mouse, last_mouse) {
                let (dx, dy) = (mx - lx, my - ly);
                if dx != 0.0 || dy != 0.0 {
                    session.drag(dx, dy);
                    needs_redraw = true;
                }
            }
            last_mouse = mouse;
        } else {
            last_mouse = None;
        }

        if let Some((_, wheel)) = window.get_scroll_wheel() {
            if wheel != 0.0 {
                session.scroll(wheel.signum());
                needs_redraw = true;
            }
        }

        if needs_redraw {
            session.render_frame(&mut frame, width, height);
            needs_redraw = false;
        }
        window.update_with_buffer(&frame, width, height)?;
        frames += 1;

        let now = Instant::now();
        let elapsed = now - fps_check;
        if elapsed > Duration::from_secs(1) {
            window.set_title(&format!(
                "{TITLE} | FPS: {:.1} | Runtime: {}s | seed {} | frequency {:.4} | zoom {:.2}",
                f64::from(frames) / elapsed.as_secs_f64(),
                (now - started).as_secs(),
                session.seed(),
                session.frequency(),
                session.viewport().zoom_factor(),
            ));
            fps_check = now;
            frames = 0;
        }
    }

    Ok(())
}
