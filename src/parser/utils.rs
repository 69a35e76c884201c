use nom::{error::ParseError, IResult, Parser};

/// Prevent a `cut` parser from poisoning an alt branch
pub(crate) fn uncut<I, O, E: ParseError<I>, F: Parser<I, O, E>>(
    mut parser: F,
) -> impl FnMut(I) -> IResult<I, O, E> {
    move |input: I| match parser.parse(input) {
        Err(nom::Err::Failure(e)) => Err(nom::Err::Error(e)),
        rest => rest,
    }
}

/// Like [`nom::combinator::cut`], but builds the failure's error value from a closure instead of
/// reusing whatever error the inner parser produced
///
/// Used after a construct has committed to a branch (e.g., a quote has been opened) so that a
/// missing terminator is reported precisely instead of as a generic parse failure.
pub(crate) fn cut_with<I, O, Ext, E, F>(
    mut parser: F,
    mut make_error: impl FnMut(I) -> Ext,
) -> impl FnMut(I) -> IResult<I, O, E>
where
    I: Clone,
    F: Parser<I, O, E>,
    E: nom::error::FromExternalError<I, Ext>,
{
    move |input: I| match parser.parse(input.clone()) {
        Err(nom::Err::Error(_)) => Err(nom::Err::Failure(E::from_external_error(
            input.clone(),
            nom::error::ErrorKind::Fail,
            make_error(input),
        ))),
        rest => rest,
    }
}
