use crate::api::reviews::ReviewOrder;
use clap::{Parser, Subcommand};
use foodbuddy_common::Tone;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foodbuddy")]
#[command(about = "영수증 OCR・AI 리뷰 작성 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 영수증 사진으로 리뷰 작성 (대화형)
    Write {
        /// 영수증 이미지 (jpg/png/webp)
        #[arg(required = true)]
        image: PathBuf,

        /// OCR 캐시를 쓰지 않음
        #[arg(long)]
        no_cache: bool,
    },

    /// 영수증 OCR만 실행
    Ocr {
        #[arg(required = true)]
        image: PathBuf,

        /// OCR 캐시를 쓰지 않음
        #[arg(long)]
        no_cache: bool,

        /// 결과를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 영수증 없이 리뷰 생성
    Generate {
        /// 식당 이름
        #[arg(short = 'n', long)]
        restaurant: String,

        /// 메뉴 ("이름:가격", 여러 번 지정)
        #[arg(short, long = "item")]
        items: Vec<String>,

        /// 말투 (friendly/professional/simple/emotional)
        #[arg(short, long, default_value = "friendly")]
        tone: Tone,

        /// 별점 (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,

        /// 추가 키워드
        #[arg(short, long)]
        keywords: Option<String>,
    },

    /// 업로드용 축소 이미지 저장
    Resize {
        #[arg(required = true)]
        image: PathBuf,

        /// 출력 파일 (기본: 원본이름-upload.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 회원가입
    Register,

    /// 로그인
    Login,

    /// 로그아웃
    Logout,

    /// 내 정보
    Me,

    /// 닉네임 변경
    Nickname {
        #[arg(required = true)]
        nickname: String,
    },

    /// 비밀번호 변경
    Password,

    /// 내 리뷰 목록
    Reviews {
        /// 정렬 (latest/oldest)
        #[arg(long, default_value = "latest")]
        order: ReviewOrder,

        /// 리뷰 삭제
        #[arg(long, value_name = "REVIEW_ID")]
        delete: Option<String>,

        /// 리뷰 공유
        #[arg(long, value_name = "REVIEW_ID")]
        share: Option<String>,
    },

    /// 즐겨찾기
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },

    /// 식당 목록
    Restaurants {
        /// 주소를 좌표로 변환
        #[arg(long)]
        geocode: bool,
    },

    /// 리뷰 통계
    Stats {
        /// 서버 집계 대신 내 리뷰 목록으로 직접 집계
        #[arg(long)]
        local: bool,
    },

    /// 화면 설정
    Prefs {
        /// 다크 모드 (true/false)
        #[arg(long)]
        dark_mode: Option<bool>,

        /// 언어 (ko/en)
        #[arg(long)]
        language: Option<String>,

        /// 시작 화면을 다시 표시
        #[arg(long)]
        reset_splash: bool,
    },

    /// 설정 표시/편집
    Config {
        /// 설정 값 변경 (예: --set jpeg_quality 70)
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
        set: Option<Vec<String>>,

        /// 백엔드 주소
        #[arg(long)]
        set_api_url: Option<String>,

        /// OpenAI API 키
        #[arg(long)]
        set_openai_key: Option<String>,

        /// 카카오 REST API 키
        #[arg(long)]
        set_kakao_key: Option<String>,

        /// 설정 표시
        #[arg(long)]
        show: bool,
    },

    /// OCR 캐시 관리
    Cache {
        /// 캐시 삭제
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// 즐겨찾기 추가
    Add { restaurant_id: String },
    /// 즐겨찾기 삭제
    Remove { restaurant_id: String },
    /// 즐겨찾기 여부 확인
    Check { restaurant_id: String },
    /// 즐겨찾기 목록
    List,
}

/// "이름:가격" 또는 "이름:가격:수량"
pub fn parse_menu_item(raw: &str) -> Result<foodbuddy_common::LineItem, String> {
    let mut parts = raw.split(':').map(str::trim);
    let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(|| format!("메뉴 이름이 없습니다: {}", raw))?;
    let price = match parts.next() {
        Some(p) => p
            .replace(',', "")
            .trim_end_matches('원')
            .parse::<i64>()
            .map_err(|_| format!("가격이 숫자가 아닙니다: {}", raw))?,
        None => 0,
    };
    let quantity = match parts.next() {
        Some(q) => Some(q.parse::<u32>().map_err(|_| format!("수량이 숫자가 아닙니다: {}", raw))?),
        None => None,
    };
    Ok(foodbuddy_common::LineItem {
        name: name.to_string(),
        price,
        quantity,
    })
}
