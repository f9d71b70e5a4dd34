//! Interactive terminal front-end (`voicechat chat`)

use dialoguer::{Input, Select};

use crate::conversation::{ConversationState, Speaker};
use crate::input::{InputMethod, MicrophoneInput, text_utterance};
use crate::locale::{self, LanguageMode};
use crate::turn::{SubmitOutcome, TurnController};
use crate::view::{ChatView, Notice, NoticeKind};

/// What the user picked from the main menu
enum MenuChoice {
    Input(InputMethod),
    SwitchLanguage,
    Quit,
}

/// Run the chat loop until the user quits
///
/// # Errors
///
/// Returns error if terminal input fails
pub async fn run_chat(
    turns: &TurnController,
    microphone: Option<&MicrophoneInput>,
    language: LanguageMode,
) -> anyhow::Result<()> {
    let mut state = ConversationState::new(language);

    println!("Dual Language Voice Chatbot\n");

    loop {
        let bundle = locale::resolve(state.language_mode);

        let utterance = match prompt_menu(&state, microphone.is_some())? {
            MenuChoice::Quit => return Ok(()),
            MenuChoice::SwitchLanguage => {
                turns.toggle_language(&mut state);
                continue;
            }
            MenuChoice::Input(InputMethod::Text) => {
                let raw: String = Input::new()
                    .with_prompt(bundle.input_prompt)
                    .allow_empty(true)
                    .interact_text()?;
                text_utterance(&raw)
            }
            MenuChoice::Input(InputMethod::Microphone) => {
                let Some(mic) = microphone else { continue };
                println!("{}", bundle.ready_to_speak);
                match mic.listen(bundle.recognizer_locale).await {
                    Ok(text) if text.is_empty() => {
                        print_notice(&Notice::not_understood(bundle));
                        continue;
                    }
                    Ok(text) => text,
                    Err(e) => {
                        print_notice(&Notice::listen_error(bundle, &e.to_string()));
                        continue;
                    }
                }
            }
        };

        if utterance.is_empty() {
            continue;
        }

        println!("{}", bundle.processing);
        let outcome = turns.submit_utterance(&mut state, &utterance).await?;
        if outcome == SubmitOutcome::Ignored {
            continue;
        }

        print_view(&ChatView::with_notices(&state, Notice::for_outcome(&outcome)));

        let choice = Select::new()
            .items(&[bundle.continue_label, bundle.stop_label])
            .default(0)
            .interact()?;

        if choice == 0 {
            turns.continue_conversation(&mut state)?;
        } else {
            let farewell = turns.end_conversation(&mut state)?;
            print_notice(&Notice::new(NoticeKind::Success, farewell));
        }
    }
}

fn prompt_menu(state: &ConversationState, microphone: bool) -> anyhow::Result<MenuChoice> {
    let bundle = locale::resolve(state.language_mode);

    let mut choices = Vec::with_capacity(4);
    if microphone {
        choices.push((bundle.record_label, MenuChoice::Input(InputMethod::Microphone)));
    }
    choices.push((bundle.text_label, MenuChoice::Input(InputMethod::Text)));
    choices.push((bundle.switch_language_label, MenuChoice::SwitchLanguage));
    choices.push((bundle.quit_label, MenuChoice::Quit));

    let labels: Vec<&str> = choices.iter().map(|(label, _)| *label).collect();
    let idx = Select::new().items(&labels).default(0).interact()?;

    Ok(choices.swap_remove(idx).1)
}

fn print_view(view: &ChatView) {
    for bubble in &view.bubbles {
        let who = match bubble.speaker {
            Speaker::User => "you",
            Speaker::Bot => "bot",
        };
        println!("[{who}] {}", bubble.text);
    }
    for notice in &view.notices {
        print_notice(notice);
    }
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Error => eprintln!("! {}", notice.message),
        NoticeKind::Warning => println!("? {}", notice.message),
        NoticeKind::Info | NoticeKind::Success => println!("{}", notice.message),
    }
}
