//! Pseudo-legal move generation.
//!
//! `MoveGenerator` walks every occupied square of the side to move and
//! dispatches by piece type, using the precomputed attack tables for leapers
//! and the magic tables for sliders. Legality (not leaving one's own king in
//! check) is filtered by the consumer via make/probe/unmake; the only check
//! awareness baked in here is castling, which must not pass through or leave
//! from an attacked square.

use crate::bitboard::{bishop_attacks, queen_attacks, rook_attacks, ATTACK_TABLES, BitboardIter};
use crate::board::Board;
use crate::types::{Color, Move, MoveFlag, Piece, PieceType, Square, PIECES_CAN_PROMOTE_TO};

/// Upper bound on moves in any legal chess position
const MAX_MOVES: usize = 218;

pub struct MoveGenerator<'a> {
    board: &'a Board,
    color: Color,
    moves: Vec<Move>,
}

impl<'a> MoveGenerator<'a> {
    pub fn new(board: &'a Board, color: Color) -> Self {
        Self {
            board,
            color,
            moves: Vec::with_capacity(MAX_MOVES),
        }
    }

    /// All pseudo-legal moves for the generator's color
    pub fn collect(&mut self) -> Vec<Move> {
        self.collect_with_mode(false)
    }

    /// Only pseudo-legal captures (including en passant)
    pub fn collect_captures(&mut self) -> Vec<Move> {
        self.collect_with_mode(true)
    }

    fn collect_with_mode(&mut self, captures_only: bool) -> Vec<Move> {
        let occupied = self.board.get_occupied();
        let friendly = self.board.get_pieces_bb(self.color);
        let enemy = self.board.get_pieces_bb(self.color.other_color());

        self.generate_knight_moves(friendly, enemy, captures_only);
        self.generate_king_moves(friendly, enemy, captures_only);
        self.generate_slider_moves(PieceType::Rook, occupied, friendly, enemy, captures_only);
        self.generate_slider_moves(PieceType::Bishop, occupied, friendly, enemy, captures_only);
        self.generate_slider_moves(PieceType::Queen, occupied, friendly, enemy, captures_only);
        self.generate_pawn_moves(occupied, enemy, captures_only);

        std::mem::take(&mut self.moves)
    }

    fn push_targets(&mut self, piece: Piece, from: Square, targets: u64) {
        for to in BitboardIter(targets) {
            let captured = self.board.piece_at(to).map(|p| p.piece_type);
            self.moves.push(Move::new(piece, from, to, captured));
        }
    }

    fn generate_knight_moves(&mut self, friendly: u64, enemy: u64, captures_only: bool) {
        let knights = self.board.get_piece_bb(self.color, PieceType::Knight);
        let piece = Piece::new(self.color, PieceType::Knight);

        for from in BitboardIter(knights) {
            let mut targets = ATTACK_TABLES.knight[from.index()] & !friendly;
            if captures_only {
                targets &= enemy;
            }
            self.push_targets(piece, from, targets);
        }
    }

    fn generate_king_moves(&mut self, friendly: u64, enemy: u64, captures_only: bool) {
        let king_bb = self.board.get_piece_bb(self.color, PieceType::King);
        if king_bb == 0 {
            return;
        }
        let from = Square(king_bb.trailing_zeros() as u8);
        let piece = Piece::new(self.color, PieceType::King);

        let mut targets = ATTACK_TABLES.king[from.index()] & !friendly;
        if captures_only {
            targets &= enemy;
        }
        self.push_targets(piece, from, targets);

        if !captures_only {
            self.generate_castling_moves(from);
        }
    }

    /// Castling in each lateral direction when the right is held, no piece
    /// occupies any square strictly between king and rook, and the king does
    /// not start from, pass through, or land on an attacked square.
    fn generate_castling_moves(&mut self, king_sq: Square) {
        let occupied = self.board.get_occupied();
        let opponent = self.color.other_color();
        let back_rank = match self.color {
            Color::White => 0,
            Color::Black => 7,
        };
        // Rights held in a hand-crafted position do not guarantee the king
        // actually stands on its original square.
        if king_sq != Square::from_file_rank(4, back_rank) {
            return;
        }
        if self.board.is_attacked(king_sq, opponent) {
            return;
        }

        let (kingside_right, queenside_right) = match self.color {
            Color::White => (
                self.board.castle_kingside_white,
                self.board.castle_queenside_white,
            ),
            Color::Black => (
                self.board.castle_kingside_black,
                self.board.castle_queenside_black,
            ),
        };
        let piece = Piece::new(self.color, PieceType::King);
        let rooks = self.board.get_piece_bb(self.color, PieceType::Rook);

        if kingside_right {
            let rook_sq = Square::from_file_rank(7, back_rank);
            let f = Square::from_file_rank(5, back_rank);
            let g = Square::from_file_rank(6, back_rank);
            if rooks & rook_sq.bb() != 0
                && occupied & (f.bb() | g.bb()) == 0
                && !self.board.is_attacked(f, opponent)
                && !self.board.is_attacked(g, opponent)
            {
                self.moves.push(Move {
                    piece,
                    from: king_sq,
                    to: g,
                    captured: None,
                    flag: MoveFlag::CastleKingside,
                });
            }
        }
        if queenside_right {
            let rook_sq = Square::from_file_rank(0, back_rank);
            let b = Square::from_file_rank(1, back_rank);
            let c = Square::from_file_rank(2, back_rank);
            let d = Square::from_file_rank(3, back_rank);
            // b1/b8 only needs to be empty; the king never crosses it
            if rooks & rook_sq.bb() != 0
                && occupied & (b.bb() | c.bb() | d.bb()) == 0
                && !self.board.is_attacked(c, opponent)
                && !self.board.is_attacked(d, opponent)
            {
                self.moves.push(Move {
                    piece,
                    from: king_sq,
                    to: c,
                    captured: None,
                    flag: MoveFlag::CastleQueenside,
                });
            }
        }
    }

    fn generate_slider_moves(
        &mut self,
        piece_type: PieceType,
        occupied: u64,
        friendly: u64,
        enemy: u64,
        captures_only: bool,
    ) {
        let sliders = self.board.get_piece_bb(self.color, piece_type);
        let piece = Piece::new(self.color, piece_type);

        for from in BitboardIter(sliders) {
            let attacks = match piece_type {
                PieceType::Rook => rook_attacks(from, occupied),
                PieceType::Bishop => bishop_attacks(from, occupied),
                PieceType::Queen => queen_attacks(from, occupied),
                _ => unreachable!("not a sliding piece"),
            };
            let mut targets = attacks & !friendly;
            if captures_only {
                targets &= enemy;
            }
            self.push_targets(piece, from, targets);
        }
    }

    fn generate_pawn_moves(&mut self, occupied: u64, enemy: u64, captures_only: bool) {
        let pawns = self.board.get_piece_bb(self.color, PieceType::Pawn);
        let piece = Piece::new(self.color, PieceType::Pawn);
        let (step, start_rank, promotion_rank): (i8, u8, u8) = match self.color {
            Color::White => (1, 1, 7),
            Color::Black => (-1, 6, 0),
        };

        for from in BitboardIter(pawns) {
            let next_rank = from.rank() as i8 + step;
            if !(0..8).contains(&next_rank) {
                // pawn on the farthest rank, only in hand-crafted positions
                continue;
            }

            // Pushes, only onto empty squares
            if !captures_only {
                let single = Square::from_file_rank(from.file(), next_rank as u8);
                if occupied & single.bb() == 0 {
                    self.push_pawn_move(piece, from, single, None, promotion_rank);
                    if from.rank() == start_rank {
                        let double =
                            Square::from_file_rank(from.file(), (from.rank() as i8 + 2 * step) as u8);
                        if occupied & double.bb() == 0 {
                            self.moves.push(Move {
                                piece,
                                from,
                                to: double,
                                captured: None,
                                flag: MoveFlag::DoublePawnPush,
                            });
                        }
                    }
                }
            }

            // Diagonal captures onto opponent-occupied or en-passant squares
            let attacks = ATTACK_TABLES.pawn[self.color.index()][from.index()];
            for to in BitboardIter(attacks & enemy) {
                let captured = self.board.piece_at(to).map(|p| p.piece_type);
                self.push_pawn_move(piece, from, to, captured, promotion_rank);
            }
            if let Some(ep_target) = self.board.en_passant_target() {
                if attacks & ep_target.bb() != 0 {
                    self.moves.push(Move {
                        piece,
                        from,
                        to: ep_target,
                        captured: Some(PieceType::Pawn),
                        flag: MoveFlag::EnPassantCapture,
                    });
                }
            }
        }
    }

    /// Push a pawn move, substituting the four promotion choices whenever the
    /// target rank is the farthest rank for the pawn's color.
    fn push_pawn_move(
        &mut self,
        piece: Piece,
        from: Square,
        to: Square,
        captured: Option<PieceType>,
        promotion_rank: u8,
    ) {
        if to.rank() == promotion_rank {
            for promoted in PIECES_CAN_PROMOTE_TO {
                self.moves.push(Move {
                    piece,
                    from,
                    to,
                    captured,
                    flag: MoveFlag::Promotion(promoted),
                });
            }
        } else {
            self.moves.push(Move::new(piece, from, to, captured));
        }
    }
}
