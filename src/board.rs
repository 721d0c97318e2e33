//! The mutable board position.
//!
//! `Board` packs piece placement into per-piece bitboards mirrored by a
//! 64-cell mailbox, together with the active color, castling rights,
//! en-passant target, move clocks and a running Zobrist hash. It is mutated
//! destructively by `make_move` and restored exactly by `unmake_move`; the
//! recursive search shares one `Board` down the whole call chain instead of
//! copying per node.

use itertools::Itertools;

use crate::bitboard::{bishop_attacks, rook_attacks, ATTACK_TABLES};
use crate::error::EngineError;
use crate::movegen::MoveGenerator;
use crate::types::{Color, Move, MoveFlag, Piece, PieceType, Square, Status, UndoInfo};
use crate::zobrist::ZOBRIST_KEYS;

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Original corner squares of the rooks, used for castling-rights bookkeeping
const WHITE_KINGSIDE_ROOK: Square = Square(7); // h1
const WHITE_QUEENSIDE_ROOK: Square = Square(0); // a1
const BLACK_KINGSIDE_ROOK: Square = Square(63); // h8
const BLACK_QUEENSIDE_ROOK: Square = Square(56); // a8

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Piece placement: `piece_bb[color][piece_type]`
    piece_bb: [[u64; 6]; 2],
    /// Per-color occupancy, kept in sync with `piece_bb`
    color_bb: [u64; 2],
    /// Mailbox mirror of the bitboards for O(1) piece lookup
    squares: [Option<Piece>; 64],
    active_color: Color,
    pub castle_kingside_white: bool,
    pub castle_queenside_white: bool,
    pub castle_kingside_black: bool,
    pub castle_queenside_black: bool,
    en_passant_target: Option<Square>,
    /// Number of half moves since last capture or pawn advance
    halfmove_clock: u32,
    /// Number of full moves. Starts at 1, and gets incremented after every
    /// black move
    fullmove_number: u32,
    pub zobrist_hash: u64,
}

impl Board {
    pub fn new() -> Board {
        Board::from_fen(STARTING_POSITION_FEN).expect("starting position FEN is valid")
    }

    /// Parse a board-description string. The grammar is validated in full:
    /// 8 ranks each summing to 8 files, active color `w`/`b`, castling
    /// rights `-` or a duplicate-free subset of `KQkq`, en-passant target
    /// `-` or a passable square, and numeric move clocks.
    pub fn from_fen(fen_string: &str) -> Result<Board, EngineError> {
        let parts: Vec<&str> = fen_string.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(EngineError::BadFieldCount(parts.len()));
        }

        let mut board = Board {
            piece_bb: [[0; 6]; 2],
            color_bb: [0; 2],
            squares: [None; 64],
            active_color: Color::White,
            castle_kingside_white: false,
            castle_queenside_white: false,
            castle_kingside_black: false,
            castle_queenside_black: false,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            zobrist_hash: 0,
        };

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(EngineError::BadRankCount(ranks.len()));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8; // FEN lists rank 8 first
            let mut file = 0u8;
            let mut prev_was_digit = false;
            for c in rank_str.chars() {
                if let Some(run) = c.to_digit(10) {
                    // A run of empty squares; runs may not be chained ("44")
                    // and "0" is not a valid run length.
                    if prev_was_digit || run == 0 {
                        return Err(EngineError::BadPieceChar(c));
                    }
                    file += run as u8;
                    prev_was_digit = true;
                } else {
                    let piece = Piece::from_char(c)?;
                    if file > 7 {
                        return Err(EngineError::BadRankSum {
                            rank: rank as usize + 1,
                            files: file + 1,
                        });
                    }
                    board.put_piece(piece, Square::from_file_rank(file, rank));
                    file += 1;
                    prev_was_digit = false;
                }
            }
            if file != 8 {
                return Err(EngineError::BadRankSum {
                    rank: rank as usize + 1,
                    files: file,
                });
            }
        }

        board.active_color = match parts[1].chars().collect::<Vec<char>>()[..] {
            [c] => Color::from_char(c)?,
            _ => return Err(EngineError::BadActiveColor(parts[1].chars().next().unwrap_or('?'))),
        };

        if parts[2] != "-" {
            for c in parts[2].chars() {
                let flag = match c {
                    'K' => &mut board.castle_kingside_white,
                    'Q' => &mut board.castle_queenside_white,
                    'k' => &mut board.castle_kingside_black,
                    'q' => &mut board.castle_queenside_black,
                    _ => return Err(EngineError::BadCastlingField(parts[2].to_string())),
                };
                if *flag {
                    return Err(EngineError::BadCastlingField(parts[2].to_string()));
                }
                *flag = true;
            }
        }

        if parts[3] != "-" {
            let sq = Square::from_algebraic(parts[3])
                .map_err(|_| EngineError::BadEnPassantField(parts[3].to_string()))?;
            // The target is the square passed over by a double pawn push, so
            // it can only lie on rank 3 or rank 6.
            if sq.rank() != 2 && sq.rank() != 5 {
                return Err(EngineError::BadEnPassantField(parts[3].to_string()));
            }
            board.en_passant_target = Some(sq);
        }

        board.halfmove_clock = parts[4].parse().map_err(|_| EngineError::BadClockField {
            field: "halfmove",
            value: parts[4].to_string(),
        })?;
        board.fullmove_number = parts[5].parse().map_err(|_| EngineError::BadClockField {
            field: "fullmove",
            value: parts[5].to_string(),
        })?;

        board.zobrist_hash = board.compute_zobrist();
        Ok(board)
    }

    /// Serialize back to a board-description string. Parsing then
    /// re-serializing reproduces the placement field exactly.
    pub fn to_fen(&self) -> String {
        let placement = (0..8u8)
            .rev()
            .map(|rank| {
                let mut rank_str = String::new();
                let mut empty_run = 0;
                for file in 0..8u8 {
                    match self.piece_at(Square::from_file_rank(file, rank)) {
                        Some(piece) => {
                            if empty_run > 0 {
                                rank_str.push_str(&empty_run.to_string());
                                empty_run = 0;
                            }
                            rank_str.push(piece.to_char());
                        }
                        None => empty_run += 1,
                    }
                }
                if empty_run > 0 {
                    rank_str.push_str(&empty_run.to_string());
                }
                rank_str
            })
            .join("/");

        let mut castling = String::new();
        if self.castle_kingside_white {
            castling.push('K');
        }
        if self.castle_queenside_white {
            castling.push('Q');
        }
        if self.castle_kingside_black {
            castling.push('k');
        }
        if self.castle_queenside_black {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = match self.en_passant_target {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement,
            self.active_color.to_char(),
            castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    pub fn piece_at_algebraic(&self, sq: &str) -> Option<Piece> {
        self.piece_at(Square::from_algebraic(sq).ok()?)
    }

    pub fn get_active_color(&self) -> Color {
        self.active_color
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline(always)]
    pub fn get_occupied(&self) -> u64 {
        self.color_bb[0] | self.color_bb[1]
    }

    #[inline(always)]
    pub fn get_pieces_bb(&self, color: Color) -> u64 {
        self.color_bb[color.index()]
    }

    #[inline(always)]
    pub fn get_piece_bb(&self, color: Color, piece_type: PieceType) -> u64 {
        self.piece_bb[color.index()][piece_type.index()]
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let bb = self.get_piece_bb(color, PieceType::King);
        if bb == 0 {
            None
        } else {
            Some(Square(bb.trailing_zeros() as u8))
        }
    }

    /// All pieces on the board with their squares
    pub fn iter_pieces(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(idx, piece)| piece.map(|p| (p, Square(idx as u8))))
    }

    fn put_piece(&mut self, piece: Piece, sq: Square) {
        debug_assert!(self.squares[sq.index()].is_none(), "putting onto occupied square");
        let bb = sq.bb();
        self.piece_bb[piece.color.index()][piece.piece_type.index()] |= bb;
        self.color_bb[piece.color.index()] |= bb;
        self.squares[sq.index()] = Some(piece);
        self.zobrist_hash ^= ZOBRIST_KEYS.piece_key(piece.color, piece.piece_type, sq);
    }

    fn remove_piece(&mut self, sq: Square) -> Piece {
        let piece = self.squares[sq.index()].expect("removing from empty square");
        let bb = sq.bb();
        self.piece_bb[piece.color.index()][piece.piece_type.index()] &= !bb;
        self.color_bb[piece.color.index()] &= !bb;
        self.squares[sq.index()] = None;
        self.zobrist_hash ^= ZOBRIST_KEYS.piece_key(piece.color, piece.piece_type, sq);
        piece
    }

    /// Recompute the Zobrist hash from scratch. Incremental maintenance in
    /// make/unmake must agree with this exactly; debug builds assert the
    /// equivalence after every unmake.
    pub fn compute_zobrist(&self) -> u64 {
        let mut hash = 0u64;
        for (piece, sq) in self.iter_pieces() {
            hash ^= ZOBRIST_KEYS.piece_key(piece.color, piece.piece_type, sq);
        }
        if self.active_color == Color::Black {
            hash ^= ZOBRIST_KEYS.side_to_move;
        }
        if self.castle_kingside_white {
            hash ^= ZOBRIST_KEYS.castle_kingside_white;
        }
        if self.castle_queenside_white {
            hash ^= ZOBRIST_KEYS.castle_queenside_white;
        }
        if self.castle_kingside_black {
            hash ^= ZOBRIST_KEYS.castle_kingside_black;
        }
        if self.castle_queenside_black {
            hash ^= ZOBRIST_KEYS.castle_queenside_black;
        }
        if let Some(sq) = self.en_passant_target {
            hash ^= ZOBRIST_KEYS.en_passant_key(sq);
        }
        hash
    }

    /// Apply a move destructively, returning the token needed to undo it.
    /// The caller must feed the token back to `unmake_move` on every exit
    /// path, including when the resulting position is discarded as illegal.
    pub fn make_move(&mut self, mv: &Move) -> UndoInfo {
        let mover = mv.piece;
        let us = mover.color;

        let mut undo = UndoInfo {
            mv: *mv,
            captured: None,
            castle_kingside_white: self.castle_kingside_white,
            castle_queenside_white: self.castle_queenside_white,
            castle_kingside_black: self.castle_kingside_black,
            castle_queenside_black: self.castle_queenside_black,
            en_passant_target: self.en_passant_target,
            halfmove_clock: self.halfmove_clock,
            zobrist_hash: self.zobrist_hash,
        };

        // XOR out the stale en-passant term; a new one is set below only on
        // a double push.
        if let Some(sq) = self.en_passant_target.take() {
            self.zobrist_hash ^= ZOBRIST_KEYS.en_passant_key(sq);
        }

        // Captures, including the displaced pawn of an en-passant capture
        if mv.flag == MoveFlag::EnPassantCapture {
            let captured_sq = Square::from_file_rank(mv.to.file(), mv.from.rank());
            let captured = self.remove_piece(captured_sq);
            debug_assert_eq!(captured.piece_type, PieceType::Pawn);
            undo.captured = Some((captured.piece_type, captured_sq));
        } else if let Some(piece_type) = mv.captured {
            let captured = self.remove_piece(mv.to);
            debug_assert_eq!(captured.piece_type, piece_type);
            undo.captured = Some((piece_type, mv.to));
        }

        self.remove_piece(mv.from);
        match mv.promotion() {
            Some(promoted) => self.put_piece(Piece::new(us, promoted), mv.to),
            None => self.put_piece(mover, mv.to),
        }

        // Castling also moves the rook
        match mv.flag {
            MoveFlag::CastleKingside => {
                let rank = mv.from.rank();
                let rook = self.remove_piece(Square::from_file_rank(7, rank));
                self.put_piece(rook, Square::from_file_rank(5, rank));
            }
            MoveFlag::CastleQueenside => {
                let rank = mv.from.rank();
                let rook = self.remove_piece(Square::from_file_rank(0, rank));
                self.put_piece(rook, Square::from_file_rank(3, rank));
            }
            _ => {}
        }

        self.update_castling_rights(mv, undo.captured.map(|(_, sq)| sq));

        if mv.flag == MoveFlag::DoublePawnPush {
            let target = Square::from_file_rank(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2);
            self.en_passant_target = Some(target);
            self.zobrist_hash ^= ZOBRIST_KEYS.en_passant_key(target);
        }

        if mover.piece_type == PieceType::Pawn || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.active_color = us.other_color();
        self.zobrist_hash ^= ZOBRIST_KEYS.side_to_move;

        undo
    }

    /// Restore the exact prior position, consuming the undo token.
    pub fn unmake_move(&mut self, undo: UndoInfo) {
        let mv = undo.mv;
        let us = mv.piece.color;

        self.remove_piece(mv.to);
        self.put_piece(mv.piece, mv.from);

        if let Some((piece_type, sq)) = undo.captured {
            self.put_piece(Piece::new(us.other_color(), piece_type), sq);
        }

        match mv.flag {
            MoveFlag::CastleKingside => {
                let rank = mv.from.rank();
                let rook = self.remove_piece(Square::from_file_rank(5, rank));
                self.put_piece(rook, Square::from_file_rank(7, rank));
            }
            MoveFlag::CastleQueenside => {
                let rank = mv.from.rank();
                let rook = self.remove_piece(Square::from_file_rank(3, rank));
                self.put_piece(rook, Square::from_file_rank(0, rank));
            }
            _ => {}
        }

        self.castle_kingside_white = undo.castle_kingside_white;
        self.castle_queenside_white = undo.castle_queenside_white;
        self.castle_kingside_black = undo.castle_kingside_black;
        self.castle_queenside_black = undo.castle_queenside_black;
        self.en_passant_target = undo.en_passant_target;
        self.halfmove_clock = undo.halfmove_clock;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }
        self.active_color = us;
        self.zobrist_hash = undo.zobrist_hash;

        debug_assert_eq!(
            self.zobrist_hash,
            self.compute_zobrist(),
            "incremental hash diverged from from-scratch recomputation"
        );
    }

    /// Clear the castling rights lost this ply: a king move loses both of
    /// the mover's rights, a rook moving off its original corner loses that
    /// right, and capturing a rook on its original corner loses the
    /// opponent's.
    fn update_castling_rights(&mut self, mv: &Move, captured_sq: Option<Square>) {
        if mv.piece.piece_type == PieceType::King {
            match mv.piece.color {
                Color::White => {
                    self.clear_castle_kingside_white();
                    self.clear_castle_queenside_white();
                }
                Color::Black => {
                    self.clear_castle_kingside_black();
                    self.clear_castle_queenside_black();
                }
            }
        }
        for rook_sq in [Some(mv.from), captured_sq].into_iter().flatten() {
            match rook_sq {
                WHITE_KINGSIDE_ROOK => self.clear_castle_kingside_white(),
                WHITE_QUEENSIDE_ROOK => self.clear_castle_queenside_white(),
                BLACK_KINGSIDE_ROOK => self.clear_castle_kingside_black(),
                BLACK_QUEENSIDE_ROOK => self.clear_castle_queenside_black(),
                _ => {}
            }
        }
    }

    fn clear_castle_kingside_white(&mut self) {
        if self.castle_kingside_white {
            self.castle_kingside_white = false;
            self.zobrist_hash ^= ZOBRIST_KEYS.castle_kingside_white;
        }
    }

    fn clear_castle_queenside_white(&mut self) {
        if self.castle_queenside_white {
            self.castle_queenside_white = false;
            self.zobrist_hash ^= ZOBRIST_KEYS.castle_queenside_white;
        }
    }

    fn clear_castle_kingside_black(&mut self) {
        if self.castle_kingside_black {
            self.castle_kingside_black = false;
            self.zobrist_hash ^= ZOBRIST_KEYS.castle_kingside_black;
        }
    }

    fn clear_castle_queenside_black(&mut self) {
        if self.castle_queenside_black {
            self.castle_queenside_black = false;
            self.zobrist_hash ^= ZOBRIST_KEYS.castle_queenside_black;
        }
    }

    /// Is `sq` attacked by any piece of `by`? Probes every enemy piece
    /// family's attacks onto the square, reusing the sliding-attack tables
    /// and direct-step checks for knight/king/pawn attackers.
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        let occupied = self.get_occupied();

        // A pawn of `by` attacks sq iff a pawn of the defender's color on sq
        // would attack the pawn's square.
        if ATTACK_TABLES.pawn[by.other_color().index()][sq.index()]
            & self.get_piece_bb(by, PieceType::Pawn)
            != 0
        {
            return true;
        }
        if ATTACK_TABLES.knight[sq.index()] & self.get_piece_bb(by, PieceType::Knight) != 0 {
            return true;
        }
        if ATTACK_TABLES.king[sq.index()] & self.get_piece_bb(by, PieceType::King) != 0 {
            return true;
        }
        let queens = self.get_piece_bb(by, PieceType::Queen);
        if rook_attacks(sq, occupied) & (self.get_piece_bb(by, PieceType::Rook) | queens) != 0 {
            return true;
        }
        if bishop_attacks(sq, occupied) & (self.get_piece_bb(by, PieceType::Bishop) | queens) != 0 {
            return true;
        }
        false
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king_sq) => self.is_attacked(king_sq, color.other_color()),
            None => false,
        }
    }

    /// All legal moves for the side to move. Pseudo-legal moves are filtered
    /// by the single legality predicate: apply, probe whether the mover's own
    /// king is attacked, undo. An empty result is reported as the terminal
    /// status instead.
    pub fn legal_moves(&mut self) -> Result<Vec<Move>, Status> {
        let color = self.active_color;
        let pseudo = {
            let mut generator = MoveGenerator::new(self, color);
            generator.collect()
        };

        let mut legal = Vec::with_capacity(pseudo.len());
        for mv in pseudo {
            let undo = self.make_move(&mv);
            let keeps_king_safe = !self.is_in_check(color);
            self.unmake_move(undo);
            if keeps_king_safe {
                legal.push(mv);
            }
        }

        if legal.is_empty() {
            if self.is_in_check(color) {
                Err(Status::Checkmate(color))
            } else {
                Err(Status::Stalemate)
            }
        } else {
            Ok(legal)
        }
    }

    /// Legal capture moves only (used for move-ordering tests)
    pub fn legal_captures(&mut self) -> Vec<Move> {
        let color = self.active_color;
        let pseudo = {
            let mut generator = MoveGenerator::new(self, color);
            generator.collect_captures()
        };
        let mut legal = Vec::with_capacity(pseudo.len());
        for mv in pseudo {
            let undo = self.make_move(&mv);
            let keeps_king_safe = !self.is_in_check(color);
            self.unmake_move(undo);
            if keeps_king_safe {
                legal.push(mv);
            }
        }
        legal
    }

    /// Terminal status of the position, if any: draw by the fifty-move rule
    /// or insufficient material, else checkmate/stalemate when the side to
    /// move has no legal reply.
    pub fn status(&mut self) -> Option<Status> {
        if self.halfmove_clock >= 100 {
            return Some(Status::FiftyMoveRule);
        }
        if self.has_insufficient_material() {
            return Some(Status::InsufficientMaterial);
        }
        self.legal_moves().err()
    }

    /// Neither side can possibly deliver mate: bare kings, or king plus a
    /// single minor piece against a bare or single-minor king.
    fn has_insufficient_material(&self) -> bool {
        for color in [Color::White, Color::Black] {
            if self.get_piece_bb(color, PieceType::Pawn) != 0
                || self.get_piece_bb(color, PieceType::Rook) != 0
                || self.get_piece_bb(color, PieceType::Queen) != 0
            {
                return false;
            }
        }
        let white_minors = (self.get_piece_bb(Color::White, PieceType::Knight)
            | self.get_piece_bb(Color::White, PieceType::Bishop))
        .count_ones();
        let black_minors = (self.get_piece_bb(Color::Black, PieceType::Knight)
            | self.get_piece_bb(Color::Black, PieceType::Bishop))
        .count_ones();
        white_minors <= 1 && black_minors <= 1
    }

    /// Resolve a long algebraic move (`e2e4`, `a7a8q`) against the current
    /// legal move set. Unparseable text and moves with no legal counterpart
    /// are rejected, never silently substituted.
    pub fn find_move(&mut self, text: &str) -> Result<Move, EngineError> {
        if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
            return Err(EngineError::UnparseableMove(text.to_string()));
        }
        let from = Square::from_algebraic(&text[0..2])
            .map_err(|_| EngineError::UnparseableMove(text.to_string()))?;
        let to = Square::from_algebraic(&text[2..4])
            .map_err(|_| EngineError::UnparseableMove(text.to_string()))?;
        let promotion = match text.chars().nth(4) {
            Some(c) => {
                let piece_type = PieceType::from_char(c)
                    .map_err(|_| EngineError::UnparseableMove(text.to_string()))?;
                if !crate::types::PIECES_CAN_PROMOTE_TO.contains(&piece_type) {
                    return Err(EngineError::UnparseableMove(text.to_string()));
                }
                Some(piece_type)
            }
            None => None,
        };

        let legal = self
            .legal_moves()
            .map_err(|_| EngineError::IllegalMove(text.to_string()))?;
        legal
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to && mv.promotion() == promotion)
            .ok_or_else(|| EngineError::IllegalMove(text.to_string()))
    }

    pub fn draw_board(&self) -> String {
        let mut out = String::new();
        for rank in (0..8u8).rev() {
            out.push_str(&format!("{} ", rank + 1));
            for file in 0..8u8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(piece) => out.push_str(piece.to_symbol()),
                    None => out.push('.'),
                }
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h\n");
        out
    }

    pub fn draw_to_terminal(&self) {
        println!("{}", self.draw_board());
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_starting_position() {
        let board = Board::new();
        assert_eq!(board.get_active_color(), Color::White);
        assert_eq!(board.get_occupied().count_ones(), 32);
        assert!(board.castle_kingside_white && board.castle_queenside_black);
        assert_eq!(
            board.piece_at_algebraic("e1"),
            Some(Piece::new(Color::White, PieceType::King))
        );
        assert_eq!(
            board.piece_at_algebraic("d8"),
            Some(Piece::new(Color::Black, PieceType::Queen))
        );
        assert_eq!(board.piece_at_algebraic("e4"), None);
    }

    #[test]
    fn test_fen_round_trip() {
        let fens = [
            STARTING_POSITION_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4k3/8/8/8/8/8/8/4K3 b - - 13 37",
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
        ];
        for fen in fens {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.to_fen(), fen);
        }
    }

    #[test]
    fn test_malformed_fens_rejected() {
        let cases: [(&str, EngineError); 10] = [
            // wrong rank sum
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1",
                EngineError::BadRankSum { rank: 2, files: 7 },
            ),
            // chained empty runs
            (
                "rnbqkbnr/pppppppp/44/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                EngineError::BadPieceChar('4'),
            ),
            // missing fields
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -",
                EngineError::BadFieldCount(5),
            ),
            // 7 ranks
            (
                "rnbqkbnr/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                EngineError::BadRankCount(7),
            ),
            // bad piece letter
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
                EngineError::BadPieceChar('x'),
            ),
            // bad color
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
                EngineError::BadActiveColor('x'),
            ),
            // illegal castling letters
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1",
                EngineError::BadCastlingField("KQxq".to_string()),
            ),
            // duplicate castling letter
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KK - 0 1",
                EngineError::BadCastlingField("KK".to_string()),
            ),
            // en passant square on an impossible rank
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e4 0 1",
                EngineError::BadEnPassantField("e4".to_string()),
            ),
            // non-numeric clock
            (
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
                EngineError::BadClockField {
                    field: "halfmove",
                    value: "x".to_string(),
                },
            ),
        ];
        for (fen, expected) in cases {
            assert_eq!(Board::from_fen(fen).unwrap_err(), expected, "fen: {fen}");
        }
    }

    #[test]
    fn test_make_unmake_restores_position_exactly() {
        let mut board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let snapshot = board.clone();

        let moves = board.legal_moves().unwrap();
        assert!(!moves.is_empty());
        for mv in moves {
            let undo = board.make_move(&mv);
            board.unmake_move(undo);
            assert_eq!(board, snapshot, "after undoing {}", mv.to_long_algebraic());
        }
    }

    #[test]
    fn test_make_unmake_depth_two() {
        // the inverse law must also hold through nested make/unmake
        let mut board = Board::new();
        let snapshot = board.clone();
        let moves = board.legal_moves().unwrap();
        for mv in moves {
            let undo = board.make_move(&mv);
            let inner_snapshot = board.clone();
            if let Ok(replies) = board.legal_moves() {
                for reply in replies {
                    let inner_undo = board.make_move(&reply);
                    board.unmake_move(inner_undo);
                    assert_eq!(board, inner_snapshot);
                }
            }
            board.unmake_move(undo);
        }
        assert_eq!(board, snapshot);
    }

    #[test]
    fn test_incremental_hash_matches_scratch_along_game() {
        let mut board = Board::new();
        // a short game touching a capture, a castle and a pawn double push
        for text in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "g8f6", "e1g1", "f6e4"] {
            let mv = board.find_move(text).unwrap();
            let _undo = board.make_move(&mv);
            assert_eq!(board.zobrist_hash, board.compute_zobrist(), "after {text}");
        }
    }

    #[test]
    fn test_hash_agreement_along_random_games() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut board = Board::new();
            for _ in 0..80 {
                let moves = match board.legal_moves() {
                    Ok(moves) => moves,
                    Err(_) => break,
                };
                let mv = moves[rng.gen_range(0..moves.len())];
                let _undo = board.make_move(&mv);
                assert_eq!(board.zobrist_hash, board.compute_zobrist());
            }
        }
    }

    #[test]
    fn test_transpositions_converge_to_same_hash() {
        let mut a = Board::new();
        for text in ["g1f3", "g8f6", "b1c3", "b8c6"] {
            let mv = a.find_move(text).unwrap();
            let _ = a.make_move(&mv);
        }
        let mut b = Board::new();
        for text in ["b1c3", "b8c6", "g1f3", "g8f6"] {
            let mv = b.find_move(text).unwrap();
            let _ = b.make_move(&mv);
        }
        assert_eq!(a.zobrist_hash, b.zobrist_hash);
        assert_eq!(a, b);
    }

    #[test]
    fn test_double_push_sets_en_passant_target() {
        let mut board = Board::new();
        let mv = board.find_move("e2e4").unwrap();
        let undo = board.make_move(&mv);
        assert_eq!(
            board.en_passant_target(),
            Some(Square::from_algebraic("e3").unwrap())
        );
        board.unmake_move(undo);
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn test_en_passant_capture_removes_pawn() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3")
                .unwrap();
        let mv = board.find_move("d4e3").unwrap();
        assert_eq!(mv.flag, MoveFlag::EnPassantCapture);
        let undo = board.make_move(&mv);
        assert_eq!(board.piece_at_algebraic("e4"), None);
        assert_eq!(
            board.piece_at_algebraic("e3"),
            Some(Piece::new(Color::Black, PieceType::Pawn))
        );
        board.unmake_move(undo);
        assert_eq!(
            board.piece_at_algebraic("e4"),
            Some(Piece::new(Color::White, PieceType::Pawn))
        );
    }

    #[test]
    fn test_castling_moves_rook_and_clears_rights() {
        let mut board =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let mv = board.find_move("e1g1").unwrap();
        assert_eq!(mv.flag, MoveFlag::CastleKingside);
        let undo = board.make_move(&mv);
        assert_eq!(
            board.piece_at_algebraic("f1"),
            Some(Piece::new(Color::White, PieceType::Rook))
        );
        assert_eq!(board.piece_at_algebraic("h1"), None);
        assert!(!board.castle_kingside_white && !board.castle_queenside_white);
        assert!(board.castle_kingside_black && board.castle_queenside_black);
        board.unmake_move(undo);
        assert!(board.castle_kingside_white && board.castle_queenside_white);
    }

    #[test]
    fn test_rook_capture_clears_opponent_right() {
        let mut board =
            Board::from_fen("r3k2r/1ppppppp/8/8/8/8/1PPPPPP1/R3K2R w KQkq - 0 1").unwrap();
        let mv = board.find_move("a1a8").unwrap();
        let _undo = board.make_move(&mv);
        assert!(!board.castle_queenside_black);
        assert!(board.castle_kingside_black);
        assert!(!board.castle_queenside_white);
    }

    #[test]
    fn test_promotion() {
        let mut board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mv = board.find_move("a7a8q").unwrap();
        let undo = board.make_move(&mv);
        assert_eq!(
            board.piece_at_algebraic("a8"),
            Some(Piece::new(Color::White, PieceType::Queen))
        );
        board.unmake_move(undo);
        assert_eq!(
            board.piece_at_algebraic("a7"),
            Some(Piece::new(Color::White, PieceType::Pawn))
        );
        assert_eq!(board.piece_at_algebraic("a8"), None);
    }

    #[test]
    fn test_halfmove_clock_resets_on_pawn_move_and_capture() {
        let mut board = Board::new();
        for (text, expected_clock) in [("g1f3", 1), ("g8f6", 2), ("e2e4", 0), ("f6e4", 0)] {
            let mv = board.find_move(text).unwrap();
            let _ = board.make_move(&mv);
            assert_eq!(board.halfmove_clock(), expected_clock, "after {text}");
        }
    }

    #[test]
    fn test_back_rank_checkmate_detected() {
        // black king mated on the back rank by a rook
        let mut mated = Board::from_fen("R5k1/5ppp/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(mated.is_in_check(Color::Black));
        assert_eq!(mated.legal_moves(), Err(Status::Checkmate(Color::Black)));
    }

    #[test]
    fn test_stalemate_detected() {
        // classic corner stalemate: black to move, not in check, no moves
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.is_in_check(Color::Black));
        assert_eq!(board.legal_moves(), Err(Status::Stalemate));
    }

    #[test]
    fn test_fifty_move_rule_status() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 100 80").unwrap();
        assert_eq!(board.status(), Some(Status::FiftyMoveRule));
    }

    #[test]
    fn test_insufficient_material_status() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4B3/4K3 w - - 10 40").unwrap();
        assert_eq!(board.status(), Some(Status::InsufficientMaterial));
        let mut live = Board::from_fen("4k3/8/8/8/8/8/4R3/4K3 w - - 10 40").unwrap();
        assert_eq!(live.status(), None);
    }

    #[test]
    fn test_find_move_rejects_illegal_and_garbage() {
        let mut board = Board::new();
        assert_eq!(
            board.find_move("e2e5").unwrap_err(),
            EngineError::IllegalMove("e2e5".to_string())
        );
        assert_eq!(
            board.find_move("xyzw").unwrap_err(),
            EngineError::UnparseableMove("xyzw".to_string())
        );
        assert_eq!(
            board.find_move("e2e4k").unwrap_err(),
            EngineError::UnparseableMove("e2e4k".to_string())
        );
        assert!(board.find_move("e2e4").is_ok());
    }

    #[test]
    fn test_count_legal_moves_from_start_position() {
        let mut board = Board::new();
        assert_eq!(board.legal_moves().unwrap().len(), 20);
    }
}
