/// How long a notice stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLength {
    /// A couple of seconds.
    Short,
    /// A few seconds more.
    Long,
}

/// A transient message, shown as a toast on Android.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// The message.
    pub text: String,
    /// Display duration.
    pub length: NoticeLength,
}

impl Notice {
    pub(crate) fn short(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            length: NoticeLength::Short,
        }
    }

    pub(crate) fn long(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            length: NoticeLength::Long,
        }
    }
}

/// State of the request button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    /// Whether the button accepts presses.
    pub enabled: bool,
    /// Button label.
    pub label: &'static str,
}

impl ButtonState {
    pub(crate) const IDLE: Self = Self {
        enabled: true,
        label: "Request permissions (small batches)",
    };

    pub(crate) const BUSY: Self = Self {
        enabled: false,
        label: "Requesting...",
    };
}

/// Something the UI has to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    /// A line appended to the status log.
    Log(String),
    /// A transient notice.
    Notice(Notice),
    /// The request button changed.
    Button(ButtonState),
    /// The summary block was rebuilt; carries its rendered text.
    Summary(String),
}

impl ScreenEvent {
    /// Numeric kind passed across the JNI boundary.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Log(_) => 0,
            Self::Notice(Notice {
                length: NoticeLength::Short,
                ..
            }) => 1,
            Self::Notice(Notice {
                length: NoticeLength::Long,
                ..
            }) => 2,
            Self::Button(ButtonState { enabled: true, .. }) => 3,
            Self::Button(ButtonState { enabled: false, .. }) => 4,
            Self::Summary(_) => 5,
        }
    }

    /// Text payload passed across the JNI boundary.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Log(text) | Self::Summary(text) => text,
            Self::Notice(notice) => &notice.text,
            Self::Button(button) => button.label,
        }
    }
}
