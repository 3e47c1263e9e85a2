use std::collections::BTreeMap;

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::{Cursor, CursorMoved, PrimaryWindow, WindowLevel, WindowResized, WindowResolution};

use crate::overlay::driver::{MountOutcome, Overlay};
use crate::render::canvas::{Canvas, PixelCanvas};
use crate::simulation::scenario::Scenario;
use crate::surface::host::{
    EventKind, FrameId, Host, HostEvent, ListenerId, PointerKind, SurfaceError, SurfaceId, SurfaceStyle, Viewport,
};

/// Host backed by the primary window: one surface, uploaded to a sprite texture
pub struct WindowHost {
    viewport: Viewport,
    pointer_kind: PointerKind,
    surface: Option<(SurfaceId, SurfaceStyle, PixelCanvas)>,
    listeners: BTreeMap<ListenerId, EventKind>,
    frame: Option<FrameId>,
    next_id: u64,
}

impl WindowHost {
    pub fn new(viewport: Viewport, pointer_kind: PointerKind) -> Self {
        Self {
            viewport,
            pointer_kind,
            surface: None,
            listeners: BTreeMap::new(),
            frame: None,
            next_id: 1,
        }
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn wants(&self, kind: EventKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    fn take_frame(&mut self) -> Option<FrameId> {
        self.frame.take()
    }

    fn canvas(&self) -> Option<(&SurfaceStyle, &PixelCanvas)> {
        self.surface.as_ref().map(|(_, style, canvas)| (style, canvas))
    }
}

impl Host for WindowHost {
    type Canvas = PixelCanvas;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn pointer_kind(&self) -> PointerKind {
        self.pointer_kind
    }

    fn attach_surface(&mut self, style: &SurfaceStyle, size: Viewport) -> Result<SurfaceId, SurfaceError> {
        if self.surface.is_some() {
            return Err(SurfaceError::Unavailable("window already hosts an overlay".into()));
        }
        let id = SurfaceId(self.next());
        self.surface = Some((id, *style, PixelCanvas::new(size.width, size.height)));
        Ok(id)
    }

    fn detach_surface(&mut self, id: SurfaceId) -> bool {
        match self.surface {
            Some((current, ..)) if current == id => {
                self.surface = None;
                true
            }
            _ => false,
        }
    }

    fn resize_surface(&mut self, id: SurfaceId, size: Viewport) -> Result<(), SurfaceError> {
        match self.surface.as_mut() {
            Some((current, _, canvas)) if *current == id => {
                canvas.resize(size.width, size.height);
                Ok(())
            }
            _ => Err(SurfaceError::Detached(id)),
        }
    }

    fn canvas_mut(&mut self, id: SurfaceId) -> Option<&mut PixelCanvas> {
        match self.surface.as_mut() {
            Some((current, _, canvas)) if *current == id => Some(canvas),
            _ => None,
        }
    }

    fn listen(&mut self, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next());
        self.listeners.insert(id, kind);
        id
    }

    fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next());
        self.frame = Some(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) -> bool {
        if self.frame == Some(id) {
            self.frame = None;
            true
        } else {
            false
        }
    }
}

#[derive(Resource)]
struct OverlayApp {
    overlay: Overlay,
    host: WindowHost,
}

#[derive(Resource)]
struct OverlayImage(Handle<Image>);

#[derive(Component)]
struct OverlaySprite;

pub fn run_2d(scenario: Scenario) {
    let window = scenario.window;
    let host = WindowHost::new(
        Viewport::new(window.width as u32, window.height as u32),
        PointerKind::Fine,
    );

    App::new()
        .insert_resource(ClearColor(Color::NONE))
        .insert_resource(OverlayApp {
            overlay: Overlay::new(scenario),
            host,
        })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "pfield".into(),
                resolution: WindowResolution::new(window.width, window.height),
                transparent: true,
                decorations: false,
                window_level: WindowLevel::AlwaysOnTop,
                cursor: Cursor {
                    hit_test: !window.click_through,
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_systems(Startup, mount_overlay_system)
        .add_systems(Update, (pointer_events_system, resize_events_system, frame_system, upload_canvas_system).chain())
        .add_systems(Last, unmount_on_exit_system)
        .run();
}

fn blank_image(width: u32, height: u32) -> Image {
    Image::new_fill(
        Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

fn mount_overlay_system(
    mut commands: Commands,
    mut app: ResMut<OverlayApp>,
    mut images: ResMut<Assets<Image>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    commands.spawn(Camera2dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::NONE),
            ..Default::default()
        },
        ..Default::default()
    });

    // Split &mut OverlayApp into &mut fields in one destructuring step
    let OverlayApp { overlay, host } = &mut *app;

    if let Ok(window) = windows.get_single() {
        host.viewport = Viewport::new(window.width() as u32, window.height() as u32);
    }

    match overlay.mount_seeded(host) {
        Ok(MountOutcome::Mounted) => {
            let Some((style, canvas)) = host.canvas() else {
                return;
            };
            let handle = images.add(blank_image(canvas.width(), canvas.height()));
            commands.spawn((
                SpriteBundle {
                    texture: handle.clone(),
                    sprite: Sprite {
                        custom_size: Some(Vec2::new(canvas.width() as f32, canvas.height() as f32)),
                        color: Color::srgba(1.0, 1.0, 1.0, style.opacity as f32),
                        ..Default::default()
                    },
                    transform: Transform::from_xyz(0.0, 0.0, style.z_index as f32 * 1e-4),
                    ..Default::default()
                },
                OverlaySprite,
            ));
            commands.insert_resource(OverlayImage(handle));
        }
        Ok(MountOutcome::Skipped(reason)) => info!(?reason, "overlay skipped, nothing to show"),
        Err(err) => warn!(error = %err, "overlay unavailable"),
    }
}

fn pointer_events_system(mut events: EventReader<CursorMoved>, time: Res<Time>, mut app: ResMut<OverlayApp>) {
    let OverlayApp { overlay, host } = &mut *app;
    let now_ms = time.elapsed_seconds_f64() * 1000.0;

    for ev in events.read() {
        if !host.wants(EventKind::PointerMove) {
            continue;
        }
        let event = HostEvent::PointerMove {
            x: ev.position.x as f64,
            y: ev.position.y as f64,
            at_ms: now_ms,
        };
        if let Err(err) = overlay.handle_event(host, event) {
            warn!(error = %err, "pointer event dropped");
        }
    }
}

fn resize_events_system(mut events: EventReader<WindowResized>, mut app: ResMut<OverlayApp>) {
    let OverlayApp { overlay, host } = &mut *app;

    for ev in events.read() {
        let size = Viewport::new(ev.width as u32, ev.height as u32);
        host.viewport = size;
        if !host.wants(EventKind::Resize) {
            continue;
        }
        if let Err(err) = overlay.handle_event(host, HostEvent::Resize(size)) {
            warn!(error = %err, "resize dropped");
        }
    }
}

fn frame_system(time: Res<Time>, mut app: ResMut<OverlayApp>) {
    let OverlayApp { overlay, host } = &mut *app;
    if let Some(frame) = host.take_frame() {
        overlay.on_frame(host, frame, time.elapsed_seconds_f64() * 1000.0);
    }
}

fn upload_canvas_system(
    app: Res<OverlayApp>,
    target: Option<Res<OverlayImage>>,
    mut images: ResMut<Assets<Image>>,
    mut sprites: Query<&mut Sprite, With<OverlaySprite>>,
) {
    let (Some(target), Some((_, canvas))) = (target, app.host.canvas()) else {
        return;
    };
    let (w, h) = (canvas.width(), canvas.height());
    if w == 0 || h == 0 {
        return;
    }
    let Some(image) = images.get_mut(&target.0) else {
        return;
    };

    if image.size() != UVec2::new(w, h) {
        image.resize(Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        });
        for mut sprite in &mut sprites {
            sprite.custom_size = Some(Vec2::new(w as f32, h as f32));
        }
    }

    image.data.clear();
    image.data.extend_from_slice(canvas.pixels());
}

fn unmount_on_exit_system(mut exits: EventReader<AppExit>, mut app: ResMut<OverlayApp>) {
    if exits.read().next().is_none() {
        return;
    }
    let OverlayApp { overlay, host } = &mut *app;
    overlay.unmount(host);
    info!("overlay unmounted on exit");
}
