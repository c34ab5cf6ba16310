//! 대화형 리뷰 작성
//!
//! 위저드의 현재 단계에 맞는 프롬프트를 띄우고, 요청이 진행되는 동안은
//! 스피너만 보여준다 (입력 불가).

use crate::api::{CachedRecognizer, ReceiptRecognizer};
use crate::capture::CaptureSession;
use crate::cli::parse_menu_item;
use crate::context::AppContext;
use crate::error::{FoodBuddyError, Result};
use crate::generator::OpenAiGenerator;
use crate::imaging::{self, PreparedImage};
use crate::share::{self, ShareOutcome};
use dialoguer::{Confirm, Input, Password, Select};
use foodbuddy_common::{format_won, LineItem, Rating, ReceiptDraft, Tone, WizardStep};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// 진행 중 표시. 작업이 끝나면 스피너를 지운다.
pub async fn with_spinner<F, T>(message: &str, task: F) -> T
where
    F: Future<Output = T>,
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let output = task.await;
    pb.finish_and_clear();
    output
}

/// 초안 표시용 텍스트
pub fn render_draft(draft: &ReceiptDraft) -> String {
    let or_blank = |s: &str| {
        if s.trim().is_empty() {
            "(직접 입력 필요)".to_string()
        } else {
            s.to_string()
        }
    };

    let mut lines = vec![
        format!("  식당: {}", or_blank(&draft.restaurant_name_guess)),
        format!("  주소: {}", or_blank(&draft.address_guess)),
    ];
    if let Some(date) = draft.receipt_date {
        lines.push(format!("  날짜: {}", date.format("%Y-%m-%d")));
    }
    if draft.line_items.is_empty() {
        lines.push("  메뉴: (직접 입력 필요)".to_string());
    } else {
        lines.push("  메뉴:".to_string());
        for item in &draft.line_items {
            match item.quantity {
                Some(q) if q > 1 => lines.push(format!(
                    "    - {} x{} {}",
                    item.name,
                    q,
                    format_won(item.price)
                )),
                _ => lines.push(format!("    - {} {}", item.name, format_won(item.price))),
            }
        }
    }
    if draft.total_amount > 0 {
        lines.push(format!("  총액: {}", format_won(draft.total_amount)));
    } else {
        lines.push("  총액: (직접 입력 필요)".to_string());
    }
    lines.join("\n")
}

/// "이름:가격, 이름:가격" 한 줄을 메뉴 목록으로
pub fn parse_menu_line(input: &str) -> std::result::Result<Vec<LineItem>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_menu_item)
        .collect()
}

fn menu_line(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| match item.quantity {
            Some(q) => format!("{}:{}:{}", item.name, item.price, q),
            None => format!("{}:{}", item.name, item.price),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `write` 명령: 이미지 → OCR → 확인/수정 → 별점・말투 → 생성 → 저장 → 공유
pub async fn run_write_wizard(ctx: &AppContext, image_path: &Path, use_cache: bool) -> Result<()> {
    if !ctx.session().is_logged_in() {
        return Err(FoodBuddyError::Unauthorized);
    }

    let image = imaging::prepare_image(image_path, ctx.config.max_image_size, ctx.config.jpeg_quality)?;
    println!(
        "✔ {} ({}x{}){}",
        image.file_name,
        image.width,
        image.height,
        if use_cache { " (캐시 사용)" } else { "" }
    );

    let api = ctx.api();
    let generator = OpenAiGenerator::from_config(&ctx.config)?;
    let recognizer: Box<dyn ReceiptRecognizer> = if use_cache {
        Box::new(CachedRecognizer::new(api.clone(), ctx.cache_dir()?))
    } else {
        Box::new(api.clone())
    };

    let mut session = CaptureSession::new(recognizer.as_ref(), &generator, &api);
    drive(&mut session, &image, ctx.config.share_command.as_deref()).await
}

async fn drive(
    session: &mut CaptureSession<'_>,
    image: &PreparedImage,
    share_command: Option<&str>,
) -> Result<()> {
    with_spinner("영수증을 분석 중입니다...", session.recognize(image)).await?;

    loop {
        match session.wizard().step() {
            WizardStep::Confirm => {
                if let Some(draft) = &session.wizard().state().draft {
                    println!("\n🧾 영수증 정보\n{}\n", render_draft(draft));
                }
                let choice = Select::new()
                    .with_prompt("정보와 일치한가요?")
                    .items(&["예", "아니오 (수정)", "처음부터 다시"])
                    .default(0)
                    .interact()?;
                match choice {
                    0 => session.wizard_mut().accept()?,
                    1 => session.wizard_mut().reject()?,
                    _ => {
                        session.wizard_mut().reset()?;
                        println!("작성을 취소했습니다");
                        return Ok(());
                    }
                }
            }

            WizardStep::Edit => prompt_edit(session)?,

            WizardStep::Rate => {
                if let Some(error) = session.wizard_mut().take_error() {
                    println!("⚠ {}", error);
                }
                if !prompt_rate(session)? {
                    session.wizard_mut().go_back()?;
                    continue;
                }
                if let Err(e) = with_spinner("리뷰를 생성 중입니다...", session.generate()).await {
                    close_on_failure(session, e)?;
                }
            }

            WizardStep::Review => {
                if let Some(error) = session.wizard_mut().take_error() {
                    println!("⚠ {}", error);
                }
                if let Some(review) = &session.wizard().state().generated {
                    println!("\n📝 [{}]\n{}\n", review.inferred_category, review.text);
                }
                let choice = Select::new()
                    .items(&["저장", "직접 수정", "다시 생성", "별점・말투 변경"])
                    .default(0)
                    .interact()?;
                match choice {
                    0 => {
                        if let Err(e) = with_spinner("리뷰를 저장 중입니다...", session.save()).await {
                            // 메시지는 Review 단계로 돌아와서 보여준다
                            tracing::debug!(error = %e, "저장 실패");
                        }
                    }
                    1 => {
                        let current = session
                            .wizard()
                            .state()
                            .generated
                            .as_ref()
                            .map(|r| r.text.clone())
                            .unwrap_or_default();
                        let text: String = Input::new()
                            .with_prompt("리뷰")
                            .with_initial_text(current)
                            .interact_text()?;
                        session.wizard_mut().edit_review_text(text)?;
                    }
                    2 => {
                        session.wizard_mut().go_back()?;
                        if let Err(e) = with_spinner("리뷰를 다시 생성 중입니다...", session.generate()).await {
                            close_on_failure(session, e)?;
                        }
                    }
                    _ => {
                        session.wizard_mut().go_back()?;
                    }
                }
            }

            WizardStep::Done => {
                let state = session.wizard().state();
                let name = state
                    .draft
                    .as_ref()
                    .map(|d| d.restaurant_name_guess.clone())
                    .unwrap_or_default();
                let text = state.generated.as_ref().map(|r| r.text.clone()).unwrap_or_default();
                if let Some(saved) = &state.saved {
                    println!("✅ 리뷰가 저장되었습니다 (ID: {})", saved.review_id);
                }

                let share_now = Confirm::new()
                    .with_prompt("리뷰를 공유할까요?")
                    .default(false)
                    .interact()?;
                if share_now {
                    if let ShareOutcome::Command(cmd) = share::share(&name, &text, share_command) {
                        println!("✔ {} 로 공유했습니다", cmd);
                    }
                }
                return Ok(());
            }

            // 진행 중 단계는 각 요청이 끝날 때 벗어난다
            step @ (WizardStep::Idle
            | WizardStep::Recognizing
            | WizardStep::Generating
            | WizardStep::Saving) => {
                tracing::warn!(?step, "예상하지 못한 위저드 단계");
                return Ok(());
            }
        }
    }
}

/// 요청 실패로 위저드가 닫혔으면 에러를 돌려주고 작성을 끝낸다.
/// 선행 조건 실패라면 단계가 그대로이므로 다음 화면에서 메시지를 보여준다.
fn close_on_failure(session: &mut CaptureSession<'_>, error: FoodBuddyError) -> Result<()> {
    if session.wizard().step() == WizardStep::Idle {
        session.wizard_mut().take_error();
        return Err(error);
    }
    tracing::debug!(error = %error, "요청 거부");
    Ok(())
}

fn prompt_edit(session: &mut CaptureSession<'_>) -> Result<()> {
    let draft = session
        .wizard()
        .state()
        .draft
        .clone()
        .ok_or(foodbuddy_common::WizardError::NoDraft)?;
    println!("\n✏ 영수증 정보 수정\n{}\n", render_draft(&draft));

    let choice = Select::new()
        .items(&["식당 이름", "주소", "메뉴", "총액", "수정 완료", "이전으로"])
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let name: String = Input::new()
                .with_prompt("식당 이름")
                .with_initial_text(draft.restaurant_name_guess)
                .allow_empty(true)
                .interact_text()?;
            session
                .wizard_mut()
                .edit_draft(|d| d.restaurant_name_guess = name.trim().to_string())?;
        }
        1 => {
            let address: String = Input::new()
                .with_prompt("주소")
                .with_initial_text(draft.address_guess)
                .allow_empty(true)
                .interact_text()?;
            session
                .wizard_mut()
                .edit_draft(|d| d.address_guess = address.trim().to_string())?;
        }
        2 => {
            let line: String = Input::new()
                .with_prompt("메뉴 (이름:가격, 이름:가격)")
                .with_initial_text(menu_line(&draft.line_items))
                .allow_empty(true)
                .validate_with(|input: &String| parse_menu_line(input).map(|_| ()))
                .interact_text()?;
            let items = parse_menu_line(&line).map_err(FoodBuddyError::Interaction)?;
            session.wizard_mut().edit_draft(|d| d.line_items = items)?;
        }
        3 => {
            let total: i64 = Input::new()
                .with_prompt("총액 (원)")
                .default(draft.total_amount.max(draft.items_sum()))
                .interact_text()?;
            session.wizard_mut().edit_draft(|d| d.total_amount = total)?;
        }
        4 => session.wizard_mut().finish_edit()?,
        _ => {
            session.wizard_mut().go_back()?;
        }
    }
    Ok(())
}

/// 별점・말투・키워드 입력. "이전으로"를 고르면 false.
fn prompt_rate(session: &mut CaptureSession<'_>) -> Result<bool> {
    let state = session.wizard().state();
    let previous_rating = state.rating.map(|r| r.value()).unwrap_or(Rating::MAX);
    let previous_tone = state.selected_tone;
    let previous_keywords = state.additional_keywords.clone().unwrap_or_default();

    let ratings: Vec<Rating> = (Rating::MIN..=Rating::MAX)
        .rev()
        .filter_map(|v| Rating::new(v).ok())
        .collect();
    let mut rating_items: Vec<String> = ratings
        .iter()
        .map(|r| format!("{} {}", r.stars(), r.satisfaction_level()))
        .collect();
    rating_items.push("이전으로".to_string());

    let rating_index = Select::new()
        .with_prompt("별점")
        .items(&rating_items)
        .default(usize::from(Rating::MAX - previous_rating))
        .interact()?;
    let Some(rating) = ratings.get(rating_index).copied() else {
        return Ok(false);
    };

    let tone_items: Vec<&str> = Tone::ALL.iter().map(|t| t.label()).collect();
    let tone_default = previous_tone
        .and_then(|t| Tone::ALL.iter().position(|x| *x == t))
        .unwrap_or(0);
    let tone_index = Select::new()
        .with_prompt("말투")
        .items(&tone_items)
        .default(tone_default)
        .interact()?;

    let keywords: String = Input::new()
        .with_prompt("추가 키워드 (선택)")
        .with_initial_text(previous_keywords)
        .allow_empty(true)
        .interact_text()?;

    let wizard = session.wizard_mut();
    wizard.set_rating(rating)?;
    wizard.select_tone(Tone::ALL[tone_index])?;
    wizard.set_keywords(Some(keywords))?;
    Ok(true)
}

/// 회원가입 입력
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub nickname: String,
}

pub fn prompt_registration() -> Result<Registration> {
    let email: String = Input::new().with_prompt("이메일").interact_text()?;
    let password = Password::new()
        .with_prompt("비밀번호 (8자 이상, 영문・숫자・특수문자)")
        .interact()?;
    let confirm_password = Password::new().with_prompt("비밀번호 확인").interact()?;
    let nickname: String = Input::new().with_prompt("닉네임").interact_text()?;
    Ok(Registration {
        email,
        password,
        confirm_password,
        nickname,
    })
}

/// (이메일, 비밀번호)
pub fn prompt_login() -> Result<(String, String)> {
    let email: String = Input::new().with_prompt("이메일").interact_text()?;
    let password = Password::new().with_prompt("비밀번호").interact()?;
    Ok((email, password))
}

/// (현재, 새 비밀번호, 확인)
pub fn prompt_password_change() -> Result<(String, String, String)> {
    let current = Password::new().with_prompt("현재 비밀번호").interact()?;
    let new = Password::new().with_prompt("새 비밀번호").interact()?;
    let confirm = Password::new().with_prompt("새 비밀번호 확인").interact()?;
    Ok((current, new, confirm))
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
