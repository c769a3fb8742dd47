use atomic_float::AtomicF32;
use nih_plug::prelude::{util, Editor, GuiContext};
use nih_plug_iced::widgets as nih_widgets;
use nih_plug_iced::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::params::NotchHarmonicsParams;

pub(crate) fn default_state() -> Arc<IcedState> {
    IcedState::from_size(300, 180)
}

pub(crate) fn create(
    params: Arc<NotchHarmonicsParams>,
    peak_meter: Arc<AtomicF32>,
    editor_state: Arc<IcedState>,
) -> Option<Box<dyn Editor>> {
    create_iced_editor::<NotchHarmonicsEditor>(editor_state, (params, peak_meter))
}

/// Two sliders, one per control port, and the output level.
struct NotchHarmonicsEditor {
    params: Arc<NotchHarmonicsParams>,
    context: Arc<dyn GuiContext>,
    peak_meter: Arc<AtomicF32>,

    sliders: [nih_widgets::param_slider::State; 2],
    meter: nih_widgets::peak_meter::State,
}

#[derive(Debug, Clone, Copy)]
enum Message {
    Param(nih_widgets::ParamMessage),
}

impl IcedEditor for NotchHarmonicsEditor {
    type Executor = executor::Default;
    type Message = Message;
    type InitializationFlags = (Arc<NotchHarmonicsParams>, Arc<AtomicF32>);

    fn new(
        (params, peak_meter): Self::InitializationFlags,
        context: Arc<dyn GuiContext>,
    ) -> (Self, Command<Self::Message>) {
        let editor = Self {
            params,
            context,
            peak_meter,
            sliders: Default::default(),
            meter: Default::default(),
        };
        (editor, Command::none())
    }

    fn context(&self) -> &dyn GuiContext {
        self.context.as_ref()
    }

    fn update(&mut self, _window: &mut WindowQueue, message: Message) -> Command<Message> {
        let Message::Param(message) = message;
        self.handle_param_message(message);
        Command::none()
    }

    fn view(&mut self) -> Element<'_, Message> {
        let [frequency_slider, harmonics_slider] = &mut self.sliders;
        let level_db = util::gain_to_db(self.peak_meter.load(Ordering::Relaxed));

        Column::new()
            .align_items(Alignment::Center)
            .padding(16)
            .spacing(8)
            .push(
                Text::new("Notch Harmonics")
                    .font(assets::NOTO_SANS_LIGHT)
                    .size(22)
                    .width(Length::Fill)
                    .horizontal_alignment(alignment::Horizontal::Center),
            )
            .push(
                nih_widgets::ParamSlider::new(frequency_slider, &self.params.base_frequency)
                    .map(Message::Param),
            )
            .push(
                nih_widgets::ParamSlider::new(harmonics_slider, &self.params.harmonics)
                    .map(Message::Param),
            )
            .push(
                nih_widgets::PeakMeter::new(&mut self.meter, level_db)
                    .hold_time(Duration::from_millis(600)),
            )
            .into()
    }
}
