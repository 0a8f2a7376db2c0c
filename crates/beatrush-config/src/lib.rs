// Game settings: timing, motion, audio, judgement windows, score rule, layout, controls

mod game_setting;
mod key_bindings;

pub use game_setting::{
    AudioSetting, GameSetting, LayoutSetting, ObjectMotionSetting, TimingSetting,
};
pub use key_bindings::{ControlSetting, KeyBindings};
