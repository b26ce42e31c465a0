use egui::{Rect, Vec2};
use egui_kittest::Harness;
use qrview_ui::QrViewApp;
use qrview_ui::config::DemoConfig;
use qrview_ui::widgets::QrCodeView;
use std::cell::RefCell;
use std::rc::Rc;

pub fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Harness that adds `view` as a widget and records the allocated rect.
pub struct ViewCtx<'a> {
    harness: Harness<'a>,
    response_rect: Rc<RefCell<Option<Rect>>>,
}

impl<'a> ViewCtx<'a> {
    pub fn new(view: QrCodeView, size: Vec2) -> Self {
        init_logger();
        let response_rect = Rc::new(RefCell::new(None));
        let recorder = Rc::clone(&response_rect);

        let harness = Harness::builder().with_size(size).build_ui(move |ui| {
            let response = ui.add(&view);
            *recorder.borrow_mut() = Some(response.rect);
        });

        Self {
            harness,
            response_rect,
        }
    }

    pub fn harness_mut(&mut self) -> &mut Harness<'a> {
        &mut self.harness
    }

    pub fn response_rect(&self) -> Option<Rect> {
        *self.response_rect.borrow()
    }
}

#[allow(unused)]
pub fn app_harness<'a>(config: DemoConfig) -> Harness<'a, QrViewApp> {
    init_logger();
    Harness::new_eframe(move |_| QrViewApp::new(config))
}
