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

use core::cell::Cell;
use core::iter::FusedIterator;

/// Gives access to the iterator at the bottom of an adapter stack, so
/// `size_hint` can be computed from the untransformed input.
pub trait HasSource {
    type Source;
    fn source(&self) -> &Self::Source;
}

/// Marks the bottom of an adapter stack.
pub struct Source<I>(pub I);

impl<I> HasSource for Source<I> {
    type Source = I;

    fn source(&self) -> &I {
        &self.0
    }
}

impl<I: Iterator> Iterator for Source<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<I: FusedIterator> FusedIterator for Source<I> {}

/// Like [`core::iter::Flatten`], but keeps the outer iterator reachable
/// through [`HasSource`] and reports how much of the current sub-iterator
/// is still pending.
pub struct Flatten<I, Sub> {
    iter: I,
    sub: Option<Sub>,
}

impl<I, Sub> Flatten<I, Sub> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            sub: None,
        }
    }
}

impl<I, Sub: ExactSizeIterator> Flatten<I, Sub> {
    pub fn pending(&self) -> usize {
        self.sub.as_ref().map_or(0, ExactSizeIterator::len)
    }
}

impl<I: HasSource, Sub> HasSource for Flatten<I, Sub> {
    type Source = I::Source;

    fn source(&self) -> &Self::Source {
        self.iter.source()
    }
}

impl<I, Sub> Iterator for Flatten<I, Sub>
where
    I: Iterator<Item = Sub>,
    Sub: Iterator,
{
    type Item = Sub::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.sub.as_mut().and_then(Iterator::next) {
                return Some(item);
            }
            match self.iter.next() {
                Some(sub) => self.sub = Some(sub),
                None => {
                    self.sub = None;
                    return None;
                }
            }
        }
    }

    fn fold<B, F>(self, init: B, mut f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        let init = match self.sub {
            Some(sub) => sub.fold(init, &mut f),
            None => init,
        };
        self.iter.fold(init, |acc, sub| sub.fold(acc, &mut f))
    }
}

impl<I, Sub> FusedIterator for Flatten<I, Sub>
where
    I: FusedIterator<Item = Sub>,
    Sub: Iterator,
{
}

/// Yields the `Ok` values of a fallible iterator and stops at the first
/// error, which is stashed until [`Self::take_err`] collects it.
pub struct ErrStash<I, E> {
    iter: I,
    err: Cell<Option<E>>,
}

impl<I, E> ErrStash<I, E> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            err: Cell::new(None),
        }
    }

    pub fn take_err(&self) -> Option<E> {
        self.err.take()
    }
}

impl<I: HasSource, E> HasSource for ErrStash<I, E> {
    type Source = I::Source;

    fn source(&self) -> &Self::Source {
        self.iter.source()
    }
}

impl<I, E, T> Iterator for ErrStash<I, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.iter.next()? {
            Ok(item) => Some(item),
            Err(e) => {
                self.err.set(Some(e));
                None
            }
        }
    }
}
