use owo_colors::OwoColorize;
use permkit_app::{NoticeLength, ScreenEvent};

/// Print events until the screen closes its channel.
pub async fn print_events(events: &async_channel::Receiver<ScreenEvent>) {
    while let Ok(event) = events.recv().await {
        print_event(&event);
    }
}

/// Print one event, colored by kind.
pub fn print_event(event: &ScreenEvent) {
    match event {
        ScreenEvent::Log(line) if line.starts_with('✓') => println!("{}", line.green()),
        ScreenEvent::Log(line) if line.starts_with('✗') => println!("{}", line.red()),
        ScreenEvent::Log(line) if line.starts_with("---") => {
            println!("{}", line.yellow().bold());
        }
        ScreenEvent::Log(line) => println!("{line}"),
        ScreenEvent::Notice(notice) => {
            let mark = match notice.length {
                NoticeLength::Short => "💬",
                NoticeLength::Long => "📣",
            };
            println!("{mark} {}", notice.text.cyan());
        }
        ScreenEvent::Button(button) => {
            println!("{}", format!("[{}]", button.label).dimmed());
        }
        ScreenEvent::Summary(text) => println!("\n{text}\n"),
    }
}
