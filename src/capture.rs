//! 영수증 → 리뷰 작성 세션
//!
//! 위저드 상태 머신에 OCR・리뷰 생성・저장 어댑터를 연결한다.
//! 단계마다 요청은 하나씩만 보내며 실패해도 자동으로 다시 시도하지 않는다.
//! 실패하면 위저드를 되돌리고 에러 메시지를 위저드에 남긴 뒤 그대로 돌려준다.
//! 선행 조건에 걸려 요청을 보내지 못한 경우도 마찬가지다.

use crate::api::{ReceiptRecognizer, ReviewRepository};
use crate::error::{FoodBuddyError, Result};
use crate::generator::ReviewGenerator;
use crate::imaging::PreparedImage;
use foodbuddy_common::{
    CompleteReviewResponse, GeneratedReview, ReceiptDraft, Wizard, WizardError,
};

pub struct CaptureSession<'a> {
    wizard: Wizard,
    recognizer: &'a dyn ReceiptRecognizer,
    generator: &'a dyn ReviewGenerator,
    repository: &'a dyn ReviewRepository,
}

impl<'a> CaptureSession<'a> {
    pub fn new(
        recognizer: &'a dyn ReceiptRecognizer,
        generator: &'a dyn ReviewGenerator,
        repository: &'a dyn ReviewRepository,
    ) -> Self {
        Self {
            wizard: Wizard::new(),
            recognizer,
            generator,
            repository,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// 확인・수정・별점 같은 동기 이벤트용
    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub fn navigation_locked(&self) -> bool {
        self.wizard.navigation_locked()
    }

    /// 단계 이동이 거부된 경우. 단계는 그대로 두고 메시지만 남긴다
    fn rejected(&mut self, error: WizardError) -> FoodBuddyError {
        self.wizard.record_error(error.to_string());
        error.into()
    }

    /// Idle → Recognizing → Confirm (실패 시 Idle)
    pub async fn recognize(&mut self, image: &PreparedImage) -> Result<()> {
        let mut draft = ReceiptDraft::new(image.data_url.clone());
        draft.receipt_date = image.receipt_date;
        if let Err(e) = self.wizard.begin_recognition_with(draft) {
            return Err(self.rejected(e));
        }

        match self.recognizer.recognize(image).await {
            Ok(fields) => {
                self.wizard.ocr_succeeded(fields)?;
                Ok(())
            }
            Err(e) => {
                self.wizard.ocr_failed(e.to_string())?;
                Err(e)
            }
        }
    }

    /// Rate → Generating → Review (실패 시 Idle, 세션 종료)
    pub async fn generate(&mut self) -> Result<GeneratedReview> {
        let request = match self.wizard.begin_generation() {
            Ok(request) => request,
            Err(e) => return Err(self.rejected(e)),
        };

        match self.generator.generate(&request).await {
            Ok(review) => {
                self.wizard.generation_succeeded(review.clone())?;
                Ok(review)
            }
            Err(e) => {
                tracing::warn!(generator = self.generator.name(), error = %e, "리뷰 생성 실패");
                self.wizard.generation_failed(e.to_string())?;
                Err(e)
            }
        }
    }

    /// Review → Saving → Done (실패 시 Review)
    pub async fn save(&mut self) -> Result<CompleteReviewResponse> {
        let request = match self.wizard.begin_save() {
            Ok(request) => request,
            Err(e) => return Err(self.rejected(e)),
        };

        match self.repository.save_review(&request).await {
            Ok(response) => {
                self.wizard.save_succeeded(response.clone())?;
                Ok(response)
            }
            Err(e) => {
                self.wizard.save_failed(e.to_string())?;
                Err(e)
            }
        }
    }
}
