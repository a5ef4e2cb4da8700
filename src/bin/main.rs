use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::Parser;
use eframe::egui;
use rand::{SeedableRng, rngs::StdRng};
use smoke_reveal::{AudioState, Config, RevealEngine, Rgba, SharedAudio, StarField, Waveform};

const OVERLAY_FADE_SECS: f32 = 1.0;
const WAVEFORM_MARGIN: f32 = 20.0;
const WAVEFORM_STROKE: f32 = 2.0;
// keeps the engine timer sane after the window was stalled (drag, minimize)
const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(version, about = "Pointer-driven smoke reveal overlay")]
struct Args {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overlay color as #rrggbb, overrides the config file.
    #[arg(long, value_parser = parse_color)]
    overlay_color: Option<Rgba>,

    /// Seed for brush, particle and star randomness.
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_color(value: &str) -> Result<Rgba, String> {
    value.parse().map_err(|err: smoke_reveal::Error| err.to_string())
}

fn color32(color: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn seeded(seed: Option<u64>, salt: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ salt),
        None => StdRng::from_entropy(),
    }
}

/// Every pointer position reported this frame, in event order.
fn pointer_moves(events: &[egui::Event]) -> Vec<egui::Pos2> {
    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::PointerMoved(pos) => Some(*pos),
            _ => None,
        })
        .collect()
}

struct RevealApp {
    engine: RevealEngine,
    stars: StarField,
    waveform: Waveform,
    audio: SharedAudio,
    overlay_color: Rgba,
    mask_texture: Option<egui::TextureHandle>,
    mask_pixels: Vec<u8>,
    last_frame_time: Instant,
    started: Instant,
    #[cfg(feature = "playback")]
    player: Option<smoke_reveal::audio::Player>,
}

impl RevealApp {
    fn new(_cc: &eframe::CreationContext, config: Config, seed: Option<u64>) -> Self {
        let (width, height) = (config.window.width, config.window.height);

        let engine = RevealEngine::with_rng(config.engine_settings(), width, height, seeded(seed, 1));
        let stars = StarField::with_rng(config.star_settings(), width, height, seeded(seed, 2));
        let mut audio = AudioState::with_rng(config.audio.tracks.clone(), seeded(seed, 3));
        if config.audio.autoplay {
            audio.set_playing(true);
        }

        Self {
            engine,
            stars,
            waveform: Waveform::new(config.waveform_settings()),
            audio: audio.shared(),
            overlay_color: config.overlay.color,
            mask_texture: None,
            mask_pixels: Vec::new(),
            last_frame_time: Instant::now(),
            started: Instant::now(),
            #[cfg(feature = "playback")]
            player: smoke_reveal::audio::Player::new(),
        }
    }

    fn waveform_rect(&self, rect: egui::Rect) -> egui::Rect {
        let settings = self.waveform.settings();
        egui::Rect::from_min_size(
            egui::pos2(
                rect.right() - WAVEFORM_MARGIN * 2.0 - settings.width,
                rect.top() + WAVEFORM_MARGIN,
            ),
            egui::vec2(settings.width, settings.height),
        )
    }

    fn handle_input(&mut self, ctx: &egui::Context, rect: egui::Rect, wave_rect: egui::Rect) {
        let (moves, hover, clicked, secondary) = ctx.input(|i| {
            (
                pointer_moves(&i.events),
                i.pointer.hover_pos(),
                i.pointer.primary_clicked(),
                i.pointer.secondary_clicked(),
            )
        });

        for pos in moves {
            if rect.contains(pos) && !wave_rect.contains(pos) {
                let local = pos - rect.min;
                self.engine.on_pointer_move(local.x, local.y);
            }
        }

        let Some(pos) = hover else {
            return;
        };
        if wave_rect.contains(pos) {
            let mut audio = self.audio.write();
            if clicked {
                let playing = audio.toggle();
                log::info!("background audio {}", if playing { "on" } else { "off" });
            } else if secondary && audio.is_playing() {
                audio.reset_track();
                log::info!("switched track to {:?}", audio.current_track());
            }
        } else if clicked && rect.contains(pos) {
            let local = pos - rect.min;
            self.engine.on_click(local.x, local.y);
        }
    }

    fn paint_backdrop(&self, painter: &egui::Painter, rect: egui::Rect) {
        let t = self.started.elapsed().as_secs_f32();
        let shade = |offset: f32| {
            let wave = |k: f32| ((t * 0.2 + offset + k).sin() * 0.5 + 0.5) * 120.0;
            egui::Color32::from_rgb(
                (30.0 + wave(0.0)) as u8,
                (20.0 + wave(2.1) * 0.5) as u8,
                (60.0 + wave(4.2)) as u8,
            )
        };
        let (top, bottom) = (shade(0.0), shade(1.5));

        let mut mesh = egui::Mesh::default();
        mesh.colored_vertex(rect.left_top(), top);
        mesh.colored_vertex(rect.right_top(), top);
        mesh.colored_vertex(rect.left_bottom(), bottom);
        mesh.colored_vertex(rect.right_bottom(), bottom);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(2, 1, 3);
        painter.add(egui::Shape::mesh(mesh));

        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "WELCOME",
            egui::FontId::proportional(64.0),
            egui::Color32::WHITE,
        );
    }

    fn paint_stars(&self, painter: &egui::Painter, rect: egui::Rect) {
        let settings = self.stars.settings();
        painter.rect_filled(rect, 0.0, color32(settings.mask_color));

        let size = egui::Vec2::splat(settings.star_size);
        for star in self.stars.stars() {
            let min = rect.min + egui::vec2(star.position.x, star.position.y);
            let alpha = (star.opacity.clamp(0.0, 1.0) * 255.0) as u8;
            painter.rect_filled(
                egui::Rect::from_min_size(min, size),
                0.0,
                egui::Color32::from_white_alpha(alpha),
            );
        }
    }

    fn paint_overlay(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: egui::Rect) {
        let concealed = !self.engine.is_revealed();
        let opacity =
            ctx.animate_bool_with_time(egui::Id::new("smoke_overlay"), concealed, OVERLAY_FADE_SECS);
        let mask = self.engine.mask();
        if opacity <= 0.0 || mask.is_empty() {
            return;
        }

        mask.write_rgba(self.overlay_color, &mut self.mask_pixels);
        let image =
            egui::ColorImage::from_rgba_unmultiplied([mask.width(), mask.height()], &self.mask_pixels);
        let options = egui::TextureOptions::LINEAR;
        match self.mask_texture.as_mut() {
            Some(texture) => texture.set(image, options),
            None => self.mask_texture = Some(ctx.load_texture("smoke_mask", image, options)),
        }

        if let Some(texture) = &self.mask_texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::from_white_alpha((opacity * 255.0) as u8),
            );
        }

        if concealed {
            let pulse = (self.started.elapsed().as_secs_f32() * 2.0).sin() * 0.25 + 0.75;
            let base = rect.center_bottom() - egui::vec2(0.0, 60.0);
            painter.text(
                base,
                egui::Align2::CENTER_CENTER,
                "MOVE TO PEEK",
                egui::FontId::monospace(14.0),
                egui::Color32::from_white_alpha((128.0 * pulse) as u8),
            );
            painter.text(
                base + egui::vec2(0.0, 22.0),
                egui::Align2::CENTER_CENTER,
                "CLICK TO BREACH",
                egui::FontId::monospace(11.0),
                egui::Color32::from_white_alpha((77.0 * pulse) as u8),
            );
        }
    }

    fn paint_waveform(&self, painter: &egui::Painter, wave_rect: egui::Rect, playing: bool) {
        let points = self
            .waveform
            .points()
            .into_iter()
            .map(|p| wave_rect.min + egui::vec2(p.x, p.y))
            .collect::<Vec<_>>();
        painter.add(egui::Shape::line(
            points,
            egui::Stroke::new(WAVEFORM_STROKE, color32(Waveform::color(playing))),
        ));
    }
}

impl eframe::App for RevealApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.last_frame_time)
            .min(MAX_FRAME_TIME);
        self.last_frame_time = current_time;

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click());

                let size = rect.size();
                if (size.x, size.y) != self.engine.viewport() {
                    self.engine.resize(size.x, size.y);
                    self.stars.resize(size.x, size.y);
                }

                let wave_rect = self.waveform_rect(rect);
                self.handle_input(ctx, rect, wave_rect);

                self.engine.frame(frame_time);
                self.stars.update();
                let playing = self.audio.read().is_playing();
                self.waveform.update(playing);

                #[cfg(feature = "playback")]
                {
                    if let Some(player) = &mut self.player {
                        player.sync(&self.audio.read());
                    }
                }

                let painter = ui.painter_at(rect);
                self.paint_backdrop(&painter, rect);
                self.paint_stars(&painter, rect);
                self.paint_overlay(ctx, &painter, rect);
                self.paint_waveform(&painter, wave_rect, playing);

                if !self.engine.is_revealed() {
                    response.on_hover_cursor(egui::CursorIcon::None);
                }
            });

        // Request continuous updates
        ctx.request_repaint();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(color) = args.overlay_color {
        config.overlay.color = color;
    }

    let title = config.window.title.clone();
    let options = eframe::NativeOptions {
        renderer: eframe::Renderer::Wgpu,
        initial_window_size: Some(egui::vec2(config.window.width, config.window.height)),
        ..Default::default()
    };
    let seed = args.seed;

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(RevealApp::new(cc, config, seed))),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoke_reveal::EngineSettings;

    #[test]
    fn every_pointer_move_event_spawns_drift() {
        let events = vec![
            egui::Event::PointerMoved(egui::pos2(10.0, 10.0)),
            egui::Event::PointerGone,
            egui::Event::PointerMoved(egui::pos2(12.0, 11.0)),
            egui::Event::PointerMoved(egui::pos2(15.0, 13.0)),
        ];
        let moves = pointer_moves(&events);
        assert_eq!(moves.len(), 3);

        let mut engine =
            RevealEngine::with_rng(EngineSettings::default(), 100.0, 100.0, seeded(Some(7), 1));
        for pos in moves {
            engine.on_pointer_move(pos.x, pos.y);
        }
        assert_eq!(engine.particles().len(), 9);
    }
}
