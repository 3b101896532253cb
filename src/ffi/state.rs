/*
 * Copyright (C) 2026 The libbottom developers
 *
 * This file is part of libbottom.
 *
 * libbottom is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * libbottom is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with libbottom. If not, see <https://www.gnu.org/licenses/>.
 */

//! The last-error register behind `bottom_get_error`.
//!
//! The register is per thread: a failure is only visible to the thread whose
//! call failed, and concurrent callers never overwrite each other's codes.

use crate::error::ErrorCode;

use std::cell::Cell;

thread_local! {
    static LAST_ERROR: Cell<ErrorCode> =
        const { Cell::new(ErrorCode::NoError) };
}

pub fn last_error() -> ErrorCode {
    LAST_ERROR.with(Cell::get)
}

pub fn set_last_error(code: ErrorCode) {
    LAST_ERROR.with(|cell| cell.set(code));
}
