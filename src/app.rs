use eframe::egui;
use std::collections::VecDeque;
use xrinput::native::{GilrsBackend, NativeEvent};
use xrinput::{
    ActiveSource, Axis2DType, AxisType, ButtonType, PulseRoute, SceneGraph, SceneTree,
    XrBroadcaster, XrController, XrInputConfig,
};

const PULSE_INTENSITY: f32 = 0.6;
const PULSE_DURATION_MS: f32 = 120.0;
const EDGE_LOG_LEN: usize = 12;

/// Desktop monitor: both hands driven by gamepads through the native fallback
/// path, since there is no XR host publishing snapshots.
pub struct MonitorApp {
    broadcaster: XrBroadcaster,
    scene: SceneTree,
    controllers: Vec<XrController>,
    backend: Option<GilrsBackend>,

    // UI state
    edge_log: VecDeque<String>,
    status_message: String,
    show_debug: bool,
}

impl MonitorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = XrInputConfig::load().unwrap_or_else(|| {
            let config = XrInputConfig::default();
            if let Err(e) = config.save() {
                log::warn!("Failed to write default config: {}", e);
            }
            config
        });

        let mut broadcaster = XrBroadcaster::new();
        let mut scene = SceneTree::new();

        let controllers = [config.left, config.right]
            .into_iter()
            .map(|hand_config| {
                let model = scene.create_node(&format!("{} model", hand_config.handedness()), None);
                let mut controller =
                    XrController::new(hand_config, &mut scene).with_visuals(vec![model]);
                controller.enable(&mut broadcaster, &mut scene);
                controller
            })
            .collect();

        let backend = match GilrsBackend::new() {
            Ok(backend) => Some(backend),
            Err(e) => {
                log::error!("Failed to initialize gamepad backend: {}", e);
                None
            }
        };

        let mut app = Self {
            broadcaster,
            scene,
            controllers,
            backend,
            edge_log: VecDeque::new(),
            status_message: String::new(),
            show_debug: false,
        };

        let events = app
            .backend
            .as_mut()
            .map(|b| b.connected_devices())
            .unwrap_or_default();
        app.route_native_events(events);

        app
    }

    fn route_native_events(&mut self, events: Vec<NativeEvent>) {
        for event in events {
            match event {
                NativeEvent::Connected(device) => {
                    let id = device.info().id.clone();
                    match self
                        .controllers
                        .iter_mut()
                        .find(|c| c.native_device_id().is_none() && c.accepts_device(device.info()))
                    {
                        Some(controller) => {
                            controller.handle_device_connected(device, &mut self.scene);
                        }
                        None => log::debug!("No free controller for native device {}", id),
                    }
                }
                NativeEvent::Disconnected { device_id } => {
                    for controller in &mut self.controllers {
                        controller.handle_device_disconnected(&device_id, &mut self.scene);
                    }
                }
            }
        }
    }

    fn process_inputs(&mut self) {
        let events = self.backend.as_mut().map(|b| b.poll()).unwrap_or_default();
        self.route_native_events(events);

        for controller in &mut self.controllers {
            controller.update(&mut self.scene);

            for button in ButtonType::ALL {
                if controller.get_button_down(button) {
                    self.edge_log
                        .push_front(format!("{} {} down", controller.hand(), button.name()));
                }
                if controller.get_button_up(button) {
                    self.edge_log
                        .push_front(format!("{} {} up", controller.hand(), button.name()));
                }
            }
        }
        self.edge_log.truncate(EDGE_LOG_LEN);

        // Nothing answers these without an XR host, keep the queue empty
        for pulse in self.broadcaster.take_haptic_requests() {
            log::debug!("Unhandled host haptic request: {:?}", pulse);
        }
    }

    fn render_controller(ui: &mut egui::Ui, controller: &mut XrController) -> Option<PulseRoute> {
        ui.heading(format!("{} hand", controller.hand()));

        let source = match controller.active_source() {
            ActiveSource::Disabled => egui::RichText::new("Disabled").color(egui::Color32::GRAY),
            ActiveSource::Controller => {
                egui::RichText::new("Controller").color(egui::Color32::GREEN)
            }
            ActiveSource::Hand => egui::RichText::new("Hand").color(egui::Color32::LIGHT_BLUE),
        };
        ui.label(source);
        ui.add_space(6.0);

        ui.group(|ui| {
            ui.label("Axes");
            ui.add(
                egui::ProgressBar::new(controller.get_axis(AxisType::Trigger)).text("Trigger"),
            );
            ui.add(egui::ProgressBar::new(controller.get_axis(AxisType::Grip)).text("Grip"));

            let stick = controller.get_axis_2d(Axis2DType::Thumbstick);
            let pad = controller.get_axis_2d(Axis2DType::Touchpad);
            ui.label(format!("Thumbstick: X {:.2} Y {:.2}", stick.x, stick.y));
            ui.label(format!("Touchpad: X {:.2} Y {:.2}", pad.x, pad.y));
        });

        ui.add_space(6.0);

        ui.group(|ui| {
            ui.label("Buttons");
            ui.horizontal_wrapped(|ui| {
                for button in ButtonType::ALL {
                    let color = if controller.get_button(button) {
                        egui::Color32::YELLOW
                    } else {
                        egui::Color32::DARK_GRAY
                    };
                    ui.label(egui::RichText::new(button.name()).color(color));
                }
            });
        });

        ui.add_space(6.0);

        if ui.button("Pulse").clicked() {
            return Some(controller.pulse(PULSE_INTENSITY, PULSE_DURATION_MS));
        }
        None
    }

    fn render_ui(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("XR Input Monitor");
                ui.separator();
                ui.checkbox(&mut self.show_debug, "Debug");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let status = if self.backend.is_some() {
                        egui::RichText::new("Gamepads").color(egui::Color32::GREEN)
                    } else {
                        egui::RichText::new("No gamepad backend").color(egui::Color32::RED)
                    };
                    ui.label(status);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.status_message.is_empty() {
                ui.label(&self.status_message);
                ui.add_space(10.0);
            }

            let mut pulsed = None;
            ui.columns(2, |columns| {
                for (column, controller) in columns.iter_mut().zip(self.controllers.iter_mut()) {
                    if let Some(route) = Self::render_controller(column, controller) {
                        pulsed = Some((controller.hand(), route));
                    }
                }
            });
            if let Some((hand, route)) = pulsed {
                self.status_message = match route {
                    PulseRoute::Dropped => format!("{} hand has no haptics", hand),
                    route => format!("{} pulse sent via {:?}", hand, route),
                };
            }

            ui.add_space(10.0);
            ui.collapsing("Button edges", |ui| {
                for entry in &self.edge_log {
                    ui.label(egui::RichText::new(entry).monospace());
                }
            });

            if self.show_debug {
                ui.add_space(10.0);
                ui.separator();
                ui.heading("Debug Info");

                for controller in &self.controllers {
                    ui.label(format!(
                        "{}: device {} | joints {} | pose {:?}",
                        controller.hand(),
                        controller.native_device_id().unwrap_or("none"),
                        controller.skeleton().len(),
                        controller.transform().position,
                    ));
                    ui.label(
                        egui::RichText::new(format!("{:?}", controller.axes())).monospace(),
                    );
                }
                ui.label(format!(
                    "Scene nodes: {} | visibility writes: {} | listeners: {}",
                    self.scene.len(),
                    self.scene.active_writes(),
                    self.broadcaster.subscriber_count(),
                ));
            }
        });
    }
}

impl Drop for MonitorApp {
    fn drop(&mut self) {
        for controller in &mut self.controllers {
            controller.disable(&mut self.broadcaster, &mut self.scene);
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_inputs();
        ctx.request_repaint();

        self.render_ui(ctx);
    }
}
