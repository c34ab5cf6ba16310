use clap::Parser;
use foodbuddy::{cache, cli, context, error, imaging, interactive, logging, maps, share};
use foodbuddy::api::reviews::ReviewOrder;
use foodbuddy::generator::{OpenAiGenerator, ReviewGenerator};
use foodbuddy_common::{aggregate, percentage, GenerationRequest, Rating, ReviewStatistics, UserStatistics};
use cli::{Cli, Commands, FavoriteAction};
use context::AppContext;
use error::{FoodBuddyError, Result};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::load()?;

    if !ctx.preferences().has_shown_splash() {
        println!("🍽  FoodBuddy - 영수증으로 쓰는 맛집 리뷰\n");
        ctx.preferences().mark_splash_shown()?;
    }

    match cli.command {
        Commands::Write { image, no_cache } => {
            println!("📸 foodbuddy - 리뷰 작성\n");
            interactive::run_write_wizard(&ctx, &image, !no_cache).await?;
        }

        Commands::Ocr { image, no_cache, json } => {
            use foodbuddy::api::{CachedRecognizer, ReceiptRecognizer};

            let prepared = imaging::prepare_image(&image, ctx.config.max_image_size, ctx.config.jpeg_quality)?;
            let api = ctx.api();
            let recognizer: Box<dyn ReceiptRecognizer> = if no_cache {
                Box::new(api)
            } else {
                Box::new(CachedRecognizer::new(api, ctx.cache_dir()?))
            };

            let fields = interactive::with_spinner(
                "영수증을 분석 중입니다...",
                recognizer.recognize(&prepared),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else {
                let mut draft = foodbuddy_common::ReceiptDraft::new("");
                draft.apply_fields(&fields);
                draft.receipt_date = prepared.receipt_date;
                println!("🧾 영수증 정보\n{}", interactive::render_draft(&draft));
                let missing = draft.missing_fields();
                if !missing.is_empty() {
                    println!("\n⚠ 인식하지 못한 항목: {}", missing.join(", "));
                }
            }
        }

        Commands::Generate { restaurant, items, tone, rating, keywords } => {
            let menu = items
                .iter()
                .map(|raw| cli::parse_menu_item(raw))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(FoodBuddyError::Interaction)?;
            let request = GenerationRequest::new(restaurant, menu, tone, Rating::new(rating)?, keywords);

            let generator = OpenAiGenerator::from_config(&ctx.config)?;
            let review = interactive::with_spinner(
                &format!("리뷰를 생성 중입니다... ({})", generator.name()),
                generator.generate(&request),
            )
            .await?;

            println!("📝 [{}]\n{}", review.inferred_category, review.text);
        }

        Commands::Resize { image, output } => {
            imaging::mime_for_path(&image)?;
            let decoded = ::image::open(&image)
                .map_err(|e| FoodBuddyError::ImageProcessing(format!("{}: {}", image.display(), e)))?;
            let resized = imaging::resize_for_upload(&decoded, ctx.config.max_image_size);
            let jpeg = imaging::encode_jpeg(&resized, ctx.config.jpeg_quality)?;

            let output = output.unwrap_or_else(|| {
                let stem = image
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "receipt".into());
                image.with_file_name(format!("{}-upload.jpg", stem))
            });
            std::fs::write(&output, &jpeg)?;
            println!(
                "✔ {}x{} → {}x{} ({} bytes): {}",
                decoded.width(),
                decoded.height(),
                resized.width(),
                resized.height(),
                jpeg.len(),
                output.display()
            );
        }

        Commands::Register => {
            let form = interactive::prompt_registration()?;
            let profile = ctx
                .api()
                .register(&form.email, &form.password, &form.confirm_password, &form.nickname)
                .await?;
            println!("✔ 회원가입이 완료되었습니다: {} ({})", profile.nickname, profile.email);
            println!("  `foodbuddy login` 으로 로그인해주세요");
        }

        Commands::Login => {
            let (email, password) = interactive::prompt_login()?;
            let response = ctx.api().login(&email, &password).await?;
            println!("✔ {}님, 환영합니다!", response.nickname);
        }

        Commands::Logout => {
            ctx.api().logout()?;
            println!("✔ 로그아웃했습니다");
        }

        Commands::Me => {
            let profile = ctx.api().me().await?;
            println!("내 정보:");
            println!("  이메일: {}", profile.email);
            println!("  닉네임: {}", profile.nickname);
            if let Some(style) = &profile.default_style_id {
                println!("  기본 말투: {}", style);
            }
        }

        Commands::Nickname { nickname } => {
            let profile = ctx.api().update_nickname(&nickname).await?;
            println!("✔ 닉네임을 변경했습니다: {}", profile.nickname);
        }

        Commands::Password => {
            let (current, new, confirm) = interactive::prompt_password_change()?;
            let message = ctx.api().change_password(&current, &new, &confirm).await?;
            let message = message.trim();
            println!("✔ {}", if message.is_empty() { "비밀번호를 변경했습니다" } else { message });
        }

        Commands::Reviews { order, delete, share: share_id } => {
            let api = ctx.api();

            if let Some(review_id) = delete {
                if interactive::confirm("리뷰를 삭제할까요?")? {
                    api.delete_review(&review_id).await?;
                    println!("✔ 리뷰를 삭제했습니다: {}", review_id);
                }
                return Ok(());
            }

            let reviews = api.my_reviews(order).await?;

            if let Some(review_id) = share_id {
                let review = reviews
                    .iter()
                    .find(|r| r.review_id == review_id)
                    .ok_or_else(|| FoodBuddyError::ApiCall(format!("리뷰를 찾을 수 없습니다: {}", review_id)))?;
                if let share::ShareOutcome::Command(cmd) =
                    share::share(&review.restaurant_name, &review.content, ctx.config.share_command.as_deref())
                {
                    println!("✔ {} 로 공유했습니다", cmd);
                }
                return Ok(());
            }

            if reviews.is_empty() {
                println!("작성한 리뷰가 없습니다");
            }
            for review in &reviews {
                let date = review
                    .created_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("[{}] {} ★{:.1} {}", review.review_id, review.restaurant_name, review.rating, date);
                println!("  {}\n", review.content.replace('\n', "\n  "));
            }
        }

        Commands::Favorites { action } => {
            let api = ctx.api();
            match action.unwrap_or(FavoriteAction::List) {
                FavoriteAction::Add { restaurant_id } => {
                    api.add_favorite(&restaurant_id).await?;
                    println!("✔ 즐겨찾기에 추가했습니다");
                }
                FavoriteAction::Remove { restaurant_id } => {
                    api.remove_favorite(&restaurant_id).await?;
                    println!("✔ 즐겨찾기에서 삭제했습니다");
                }
                FavoriteAction::Check { restaurant_id } => {
                    let favorite = api.is_favorite(&restaurant_id).await?;
                    println!("{}", if favorite { "★ 즐겨찾기" } else { "☆ 즐겨찾기 아님" });
                }
                FavoriteAction::List => {
                    let favorites = api.my_favorites().await?;
                    if favorites.is_empty() {
                        println!("즐겨찾기한 식당이 없습니다");
                    }
                    for fav in &favorites {
                        println!(
                            "[{}] {} ({}) {}",
                            fav.restaurant_id, fav.restaurant_name, fav.restaurant_category, fav.restaurant_address
                        );
                    }
                }
            }
        }

        Commands::Restaurants { geocode } => {
            let restaurants = ctx.api().restaurants().await?;
            let coordinates = if geocode {
                let provider = maps::KakaoMapProvider::from_config(&ctx.config)?;
                interactive::with_spinner("주소를 검색 중입니다...", maps::geocode_all(&provider, &restaurants)).await
            } else {
                Default::default()
            };

            for restaurant in &restaurants {
                let location = match coordinates.get(&restaurant.restaurant_id) {
                    Some(Some(c)) => format!(" ({:.6}, {:.6})", c.latitude, c.longitude),
                    Some(None) => " (좌표 없음)".to_string(),
                    None => String::new(),
                };
                println!(
                    "[{}] {} ({}) {}{}",
                    restaurant.restaurant_id, restaurant.name, restaurant.category, restaurant.address, location
                );
            }
        }

        Commands::Stats { local } => {
            let api = ctx.api();
            if local {
                let reviews = api.my_reviews(ReviewOrder::Latest).await?;
                let stats = aggregate(&reviews, chrono::Local::now().date_naive());
                print_local_stats(&stats);
            } else {
                let stats = api.my_statistics().await?;
                print_server_stats(&stats);
            }
        }

        Commands::Prefs { dark_mode, language, reset_splash } => {
            let prefs = ctx.preferences();
            if let Some(enabled) = dark_mode {
                prefs.set_dark_mode(enabled)?;
            }
            if let Some(language) = language {
                prefs.set_language(&language)?;
            }
            if reset_splash {
                prefs.reset_splash()?;
            }

            println!("화면 설정:");
            println!("  다크 모드: {}", if prefs.dark_mode() { "켜짐" } else { "꺼짐" });
            println!("  언어: {}", prefs.language());
            println!("  시작 화면 표시함: {}", prefs.has_shown_splash());
        }

        Commands::Config { set, set_api_url, set_openai_key, set_kakao_key, show } => {
            let mut config = ctx.config.clone();
            let mut changed = false;

            if let Some(pair) = set {
                if let [key, value] = pair.as_slice() {
                    config.set_value(key, value)?;
                    changed = true;
                }
            }
            if let Some(url) = set_api_url {
                config.set_value("api_base_url", &url)?;
                changed = true;
            }
            if let Some(key) = set_openai_key {
                config.set_value("openai_api_key", &key)?;
                changed = true;
            }
            if let Some(key) = set_kakao_key {
                config.set_value("kakao_api_key", &key)?;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 설정을 저장했습니다");
            }

            if show || !changed {
                let key_state = |k: &Option<String>| if k.is_some() { "설정됨" } else { "미설정" };
                println!("설정:");
                println!("  백엔드: {}", config.api_base_url());
                println!("  OpenAI 모델: {}", config.openai_model);
                println!("  OpenAI API 키: {}", key_state(&config.openai_api_key));
                println!("  Kakao API 키: {}", key_state(&config.kakao_api_key));
                println!("  최대 이미지 크기: {}px", config.max_image_size);
                println!("  JPEG 품질: {}", config.jpeg_quality);
                println!(
                    "  요청 타임아웃: {}초 (OCR {}초, 리뷰 생성 {}초)",
                    config.request_timeout_seconds, config.ocr_timeout_seconds, config.generation_timeout_seconds
                );
                println!("  공유 명령: {}", config.share_command.as_deref().unwrap_or("(화면 출력)"));
                println!("  로그인: {}", ctx.session().nickname().unwrap_or_else(|| "안 함".into()));
            }
        }

        Commands::Cache { clear } => {
            let dir = ctx.cache_dir()?;
            let cache_path = cache::OcrCache::cache_path(&dir);

            if clear {
                match cache::OcrCache::clear(&dir) {
                    Ok(true) => println!("✔ 캐시를 삭제했습니다: {}", cache_path.display()),
                    Ok(false) => println!("캐시 파일이 없습니다"),
                    Err(e) => println!("캐시 삭제 오류: {}", e),
                }
            } else if cache_path.exists() {
                let cache = cache::OcrCache::load(&dir);
                println!("캐시 정보:");
                println!("  경로: {}", cache_path.display());
                println!("  건수: {}", cache.len());
                if let Ok(meta) = std::fs::metadata(&cache_path) {
                    println!("  크기: {} bytes", meta.len());
                }
            } else {
                println!("캐시 파일이 없습니다: {}", cache_path.display());
            }
        }
    }

    Ok(())
}

fn print_local_stats(stats: &ReviewStatistics) {
    println!("📊 리뷰 통계 (직접 집계)");
    println!("  총 리뷰: {}개", stats.total_review_count);
    println!("  평균 별점: {:.1}", stats.avg_rating);
    println!("  이번 달: {}개", stats.this_month_review_count);
    if let Some(category) = stats.favorite_category() {
        println!("  최애 카테고리: {}", category);
    }

    println!("\n  별점 분포:");
    for (i, count) in stats.rating_histogram.iter().enumerate().rev() {
        println!(
            "    {}점: {}개 ({}%)",
            i + 1,
            count,
            percentage(*count, stats.total_review_count)
        );
    }

    print_categories(&stats.category_distribution, stats.total_review_count);

    println!("\n  월별:");
    for (month, count) in &stats.monthly_review_count {
        println!("    {}: {}개", month, count);
    }

    print_top_visited(&stats.top_visited_restaurants);
}

fn print_server_stats(stats: &UserStatistics) {
    println!("📊 리뷰 통계");
    println!("  총 리뷰: {}개", stats.total_review_count);
    println!("  평균 별점: {:.1}", stats.avg_rating);
    println!("  이번 달: {}개", stats.this_month_review_count);

    print_categories(&stats.category_distribution, stats.total_review_count);

    println!("\n  월별:");
    for (month, count) in &stats.monthly_review_count {
        println!("    {}: {}개", month, count);
    }

    print_top_visited(&stats.top_visited_restaurants);
}

fn print_categories(distribution: &BTreeMap<String, usize>, total: usize) {
    if distribution.is_empty() {
        return;
    }
    println!("\n  카테고리:");
    for line in category_lines(distribution, total) {
        println!("    {}", line);
    }
}

/// 많은 순으로 정렬한 "카테고리: N개 (P%)" 목록
fn category_lines(distribution: &BTreeMap<String, usize>, total: usize) -> Vec<String> {
    let mut entries: Vec<_> = distribution.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .map(|(category, count)| format!("{}: {}개 ({}%)", category, count, percentage(*count, total)))
        .collect()
}

fn print_top_visited(top: &[foodbuddy_common::TopVisited]) {
    if top.is_empty() {
        return;
    }
    println!("\n  자주 방문한 식당:");
    for (rank, visit) in top.iter().enumerate() {
        println!("    {}. {} ({}) {}회", rank + 1, visit.name, visit.category, visit.visit_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lines() {
        let mut distribution = BTreeMap::new();
        distribution.insert("일식".to_string(), 1);
        distribution.insert("한식".to_string(), 3);
        let lines = category_lines(&distribution, 4);
        assert_eq!(lines, vec!["한식: 3개 (75%)", "일식: 1개 (25%)"]);
    }
}
