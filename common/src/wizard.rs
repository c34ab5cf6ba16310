//! 영수증 → 리뷰 작성 위저드 상태 머신
//!
//! 단계는 WizardStep 열거형이고, 허용된 전이는 TRANSITIONS 표에만 있다.
//! 표에 없는 전이나 선행 조건이 빠진 전이는 WizardError를 반환하며
//! 상태는 바뀌지 않는다.
//!
//! 흐름:
//! Idle → Recognizing → Confirm → (Edit) → Rate → Generating → Review → Saving → Done
//!
//! Recognizing / Generating / Saving 동안은 네트워크 요청이 진행 중이므로
//! 앱 전체 내비게이션이 잠긴다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tone::{Rating, Tone};
use crate::types::{
    CompleteReviewRequest, CompleteReviewResponse, GeneratedReview, GenerationRequest,
    ReceiptDraft, ReceiptFields,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    Idle,
    /// OCR 요청 중
    Recognizing,
    /// "정보와 일치한가요?"
    Confirm,
    /// OCR 결과 수동 수정
    Edit,
    /// 별점・말투 선택
    Rate,
    /// 리뷰 생성 요청 중
    Generating,
    /// 생성된 리뷰 수정
    Review,
    /// 저장 요청 중
    Saving,
    Done,
}

/// 허용된 전이 (from, to)
pub const TRANSITIONS: &[(WizardStep, WizardStep)] = &[
    (WizardStep::Idle, WizardStep::Recognizing),
    (WizardStep::Recognizing, WizardStep::Confirm),
    (WizardStep::Recognizing, WizardStep::Idle),
    (WizardStep::Confirm, WizardStep::Rate),
    (WizardStep::Confirm, WizardStep::Edit),
    (WizardStep::Edit, WizardStep::Confirm),
    (WizardStep::Edit, WizardStep::Rate),
    (WizardStep::Rate, WizardStep::Edit),
    (WizardStep::Rate, WizardStep::Generating),
    (WizardStep::Generating, WizardStep::Review),
    (WizardStep::Generating, WizardStep::Idle),
    (WizardStep::Review, WizardStep::Rate),
    (WizardStep::Review, WizardStep::Saving),
    (WizardStep::Saving, WizardStep::Done),
    (WizardStep::Saving, WizardStep::Review),
];

impl WizardStep {
    pub fn can_transition_to(self, next: WizardStep) -> bool {
        TRANSITIONS.iter().any(|&(from, to)| from == self && to == next)
    }

    /// 네트워크 요청이 진행 중인 단계
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            WizardStep::Recognizing | WizardStep::Generating | WizardStep::Saving
        )
    }

    /// go_back 대상
    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Edit => Some(WizardStep::Confirm),
            WizardStep::Rate => Some(WizardStep::Edit),
            WizardStep::Review => Some(WizardStep::Rate),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("{from:?} 단계에서 {to:?} 단계로 이동할 수 없습니다")]
    IllegalTransition { from: WizardStep, to: WizardStep },

    #[error("현재 단계({actual:?})에서는 할 수 없는 작업입니다 (필요: {expected:?})")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("먼저 영수증을 업로드해주세요!")]
    NoDraft,

    #[error("영수증 정보 확인을 완료해주세요!")]
    DraftNotConfirmed,

    #[error("별점을 선택해주세요!")]
    RatingMissing,

    #[error("말투를 선택해주세요!")]
    ToneMissing,

    #[error("생성된 리뷰가 없습니다")]
    NoGeneratedReview,

    #[error("리뷰 내용이 비어 있습니다")]
    EmptyReview,

    #[error("요청이 진행 중입니다. 완료될 때까지 기다려주세요")]
    RequestInFlight,
}

/// 위저드 상태. 한 번의 캡처 세션 동안만 유효하다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub current_step: WizardStep,
    pub draft: Option<ReceiptDraft>,
    /// 수정 전 OCR 원본
    pub ocr_snapshot: Option<ReceiptFields>,
    pub confirmed: bool,
    pub rating: Option<Rating>,
    pub selected_tone: Option<Tone>,
    pub additional_keywords: Option<String>,
    pub generated: Option<GeneratedReview>,
    pub saved: Option<CompleteReviewResponse>,
    pub last_error: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: WizardStep::Idle,
            draft: None,
            ocr_snapshot: None,
            confirmed: false,
            rating: None,
            selected_tone: None,
            additional_keywords: None,
            generated: None,
            saved: None,
            last_error: None,
        }
    }
}

/// 위저드 컨트롤러
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    state: WizardState,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.current_step
    }

    /// 셸에 노출하는 내비게이션 비활성화 플래그
    pub fn navigation_locked(&self) -> bool {
        self.state.current_step.is_in_flight()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.state.last_error.take()
    }

    /// 단계를 바꾸지 않고 에러 메시지만 남긴다 (선행 조건 실패 등)
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.state.last_error = Some(message.into());
    }

    /// 단계 이동 (전이 표 + 선행 조건 검사)
    pub fn advance(&mut self, target: WizardStep) -> Result<WizardStep, WizardError> {
        let from = self.state.current_step;
        if !from.can_transition_to(target) {
            return Err(WizardError::IllegalTransition { from, to: target });
        }
        self.check_guard(from, target)?;

        match (from, target) {
            (WizardStep::Confirm, WizardStep::Rate) | (WizardStep::Edit, WizardStep::Rate) => {
                self.state.confirmed = true;
            }
            (_, WizardStep::Edit) => {
                self.state.confirmed = false;
            }
            (_, WizardStep::Idle) => {
                // 모달을 닫으면 세션 내용은 남기지 않는다
                self.state = WizardState::default();
            }
            _ => {}
        }

        tracing::debug!(?from, to = ?target, "wizard transition");
        self.state.current_step = target;
        Ok(target)
    }

    fn check_guard(&self, from: WizardStep, target: WizardStep) -> Result<(), WizardError> {
        match target {
            WizardStep::Confirm | WizardStep::Edit | WizardStep::Rate => {
                if self.state.draft.is_none() {
                    return Err(WizardError::NoDraft);
                }
                // 생성/리뷰 단계에서 돌아오는 경우에도 확인된 초안이 있어야 한다
                if target == WizardStep::Rate
                    && !matches!(from, WizardStep::Confirm | WizardStep::Edit)
                    && !self.state.confirmed
                {
                    return Err(WizardError::DraftNotConfirmed);
                }
            }
            WizardStep::Generating => {
                if !self.state.confirmed {
                    return Err(WizardError::DraftNotConfirmed);
                }
                if self.state.rating.is_none() {
                    return Err(WizardError::RatingMissing);
                }
                if self.state.selected_tone.is_none() {
                    return Err(WizardError::ToneMissing);
                }
            }
            WizardStep::Review if from == WizardStep::Generating => {
                if self.state.generated.is_none() {
                    return Err(WizardError::NoGeneratedReview);
                }
            }
            WizardStep::Saving => match &self.state.generated {
                None => return Err(WizardError::NoGeneratedReview),
                Some(review) if review.text.trim().is_empty() => {
                    return Err(WizardError::EmptyReview)
                }
                Some(_) => {}
            },
            _ => {}
        }
        Ok(())
    }

    /// 이전 단계로 (Edit→Confirm, Rate→Edit, Review→Rate)
    pub fn go_back(&mut self) -> Result<WizardStep, WizardError> {
        let from = self.state.current_step;
        match from.previous() {
            Some(prev) => self.advance(prev),
            None => Err(WizardError::IllegalTransition {
                from,
                to: WizardStep::Idle,
            }),
        }
    }

    /// 세션 초기화. 요청 진행 중에는 취소할 수 없다.
    pub fn reset(&mut self) -> Result<(), WizardError> {
        if self.navigation_locked() {
            return Err(WizardError::RequestInFlight);
        }
        self.state = WizardState::default();
        Ok(())
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        let actual = self.state.current_step;
        if actual == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep { expected, actual })
        }
    }

    // =============================================
    // OCR
    // =============================================

    /// 이미지 업로드 후 OCR 시작
    pub fn begin_recognition(&mut self, image_data: impl Into<String>) -> Result<(), WizardError> {
        self.begin_recognition_with(ReceiptDraft::new(image_data))
    }

    /// 이미 만든 초안(촬영 날짜 등 포함)으로 OCR 시작
    pub fn begin_recognition_with(&mut self, draft: ReceiptDraft) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Idle)?;
        self.state = WizardState {
            draft: Some(draft),
            ..WizardState::default()
        };
        self.advance(WizardStep::Recognizing)?;
        Ok(())
    }

    pub fn ocr_succeeded(&mut self, fields: ReceiptFields) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Recognizing)?;
        let draft = self.state.draft.as_mut().ok_or(WizardError::NoDraft)?;
        draft.apply_fields(&fields);
        self.state.ocr_snapshot = Some(fields);
        self.advance(WizardStep::Confirm)?;
        Ok(())
    }

    /// OCR 실패: 에러를 남기고 모달을 닫는다 (재시도 없음)
    pub fn ocr_failed(&mut self, message: impl Into<String>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Recognizing)?;
        self.advance(WizardStep::Idle)?;
        self.state.last_error = Some(message.into());
        Ok(())
    }

    // =============================================
    // 확인・수정
    // =============================================

    /// "예": 바로 별점 단계로
    pub fn accept(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Confirm)?;
        self.advance(WizardStep::Rate)?;
        Ok(())
    }

    /// "아니오": 수정 단계로
    pub fn reject(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Confirm)?;
        self.advance(WizardStep::Edit)?;
        Ok(())
    }

    pub fn edit_draft<F>(&mut self, edit: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut ReceiptDraft),
    {
        self.expect_step(WizardStep::Edit)?;
        let draft = self.state.draft.as_mut().ok_or(WizardError::NoDraft)?;
        edit(draft);
        Ok(())
    }

    /// "수정완료"
    pub fn finish_edit(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Edit)?;
        self.advance(WizardStep::Rate)?;
        Ok(())
    }

    // =============================================
    // 별점・말투
    // =============================================

    pub fn set_rating(&mut self, rating: Rating) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Rate)?;
        self.state.rating = Some(rating);
        Ok(())
    }

    pub fn select_tone(&mut self, tone: Tone) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Rate)?;
        self.state.selected_tone = Some(tone);
        Ok(())
    }

    pub fn set_keywords(&mut self, keywords: Option<String>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Rate)?;
        self.state.additional_keywords = keywords
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(())
    }

    // =============================================
    // 리뷰 생성
    // =============================================

    /// 생성 단계로 이동하고 생성 요청을 만든다
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, WizardError> {
        self.expect_step(WizardStep::Rate)?;
        self.advance(WizardStep::Generating)?;
        self.state.last_error = None;

        let draft = self.state.draft.as_ref().ok_or(WizardError::NoDraft)?;
        let rating = self.state.rating.ok_or(WizardError::RatingMissing)?;
        let tone = self.state.selected_tone.ok_or(WizardError::ToneMissing)?;

        Ok(GenerationRequest::new(
            draft.restaurant_name_guess.clone(),
            draft.line_items.clone(),
            tone,
            rating,
            self.state.additional_keywords.clone(),
        ))
    }

    pub fn generation_succeeded(&mut self, review: GeneratedReview) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Generating)?;
        self.state.generated = Some(review);
        self.advance(WizardStep::Review)?;
        Ok(())
    }

    /// 생성 실패: OCR 실패와 같이 에러를 남기고 모달을 닫는다
    pub fn generation_failed(&mut self, message: impl Into<String>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Generating)?;
        self.advance(WizardStep::Idle)?;
        self.state.last_error = Some(message.into());
        Ok(())
    }

    pub fn edit_review_text(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Review)?;
        let review = self
            .state
            .generated
            .as_mut()
            .ok_or(WizardError::NoGeneratedReview)?;
        review.text = text.into();
        Ok(())
    }

    // =============================================
    // 저장
    // =============================================

    /// 저장 단계로 이동하고 `/api/reviews/complete` 요청을 만든다
    pub fn begin_save(&mut self) -> Result<CompleteReviewRequest, WizardError> {
        self.expect_step(WizardStep::Review)?;
        self.advance(WizardStep::Saving)?;
        self.state.last_error = None;

        let draft = self.state.draft.as_ref().ok_or(WizardError::NoDraft)?;
        let review = self
            .state
            .generated
            .as_ref()
            .ok_or(WizardError::NoGeneratedReview)?;
        let rating = self.state.rating.ok_or(WizardError::RatingMissing)?;
        let tone = self.state.selected_tone.ok_or(WizardError::ToneMissing)?;

        let (ocr_name, ocr_address, ocr_items) = match &self.state.ocr_snapshot {
            Some(fields) => (
                fields.restaurant_name.clone(),
                fields.address.clone(),
                fields.items.clone(),
            ),
            None => (
                draft.restaurant_name_guess.clone(),
                draft.address_guess.clone(),
                draft.line_items.clone(),
            ),
        };

        Ok(CompleteReviewRequest {
            ocr_restaurant_name: ocr_name,
            ocr_address: Some(ocr_address).filter(|a| !a.trim().is_empty()),
            original_img: Some(draft.image_data.clone()).filter(|i| !i.is_empty()),
            receipt_date: draft.receipt_date,
            ocr_menu_items: ocr_items,
            restaurant_name: draft.restaurant_name_guess.clone(),
            restaurant_category: Some(review.inferred_category.clone()),
            restaurant_address: draft.address_guess.clone(),
            location_id: None,
            style_id: tone.id().to_string(),
            review_content: review.text.trim().to_string(),
            rating: rating.value(),
        })
    }

    pub fn save_succeeded(&mut self, response: CompleteReviewResponse) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Saving)?;
        self.state.saved = Some(response);
        self.advance(WizardStep::Done)?;
        Ok(())
    }

    pub fn save_failed(&mut self, message: impl Into<String>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Saving)?;
        self.advance(WizardStep::Review)?;
        self.state.last_error = Some(message.into());
        Ok(())
    }
}
