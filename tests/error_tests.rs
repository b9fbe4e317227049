// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use storyteller::error::AppError;

#[test]
fn test_is_openai_rate_limit_matches_marker() {
    let err = AppError::OpenAi(AppError::OPENAI_RATE_LIMIT.to_string());
    assert!(err.is_openai_rate_limit());
}

#[test]
fn test_is_openai_rate_limit_no_match() {
    let err = AppError::OpenAi("HTTP 500: upstream broke".to_string());
    assert!(!err.is_openai_rate_limit());

    let err = AppError::OpenAi(AppError::OPENAI_AUTH_ERROR.to_string());
    assert!(!err.is_openai_rate_limit());

    let err = AppError::BadRequest("Bad Request".to_string());
    assert!(!err.is_openai_rate_limit());
}
